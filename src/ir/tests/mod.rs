mod golden_tests;

use crate::bril::{program_to_text, Program};
use crate::config::Config;
use crate::ir::optimizer::{apply_lvn_to_program, eliminate_dead_assignments};
use pretty_assertions::assert_eq;
use std::fs::File;
use std::io::{read_to_string, Write};

// Golden files hold optional `FLAG=value` lines, the input program as bril
// json and the expected text, separated by `%%%%`.
pub(self) fn test_golden_text(filename: &str) {
    let file = File::open(filename).expect("test file exists");
    let contents = read_to_string(file).unwrap();
    let mut split_contents: Vec<&str> = contents.split("%%%%").collect();
    let expected_text = split_contents.pop().unwrap().trim();
    let input = split_contents.pop().unwrap().trim();
    let opt_flags = split_contents.pop();
    let (mut lvn, mut dce) = (false, false);
    let mut config = Config::default();

    if let Some(flags) = opt_flags {
        for line in flags.lines() {
            let flag = line.trim();
            if flag.is_empty() {
                continue;
            }
            let mut flag_setting = flag.split('=');
            let flag = flag_setting.next().unwrap();
            let setting = flag_setting.next().unwrap() == "on";

            match flag {
                "LVN" => lvn = setting,
                "DCE" => dce = setting,
                "COMMUTATIVE" => config.commutative_lvn = setting,
                _ => panic!("unrecognized optimization flag"),
            }
        }
    }

    let mut program = Program::from_json(input).unwrap();

    if lvn {
        program = apply_lvn_to_program(&program, &config).unwrap();
    }
    if dce {
        program = eliminate_dead_assignments(&program, &config).unwrap().converged;
    }

    let actual_text = program_to_text(&program);

    if std::env::var("GOLDEN_UPDATE").is_ok() {
        let mut new_file = File::create(filename).expect("test file exists");
        let mut new_contents = String::new();

        if let Some(flags) = opt_flags {
            new_contents.push_str(flags.trim());
            new_contents.push_str("\n\n%%%%\n\n");
        }
        new_contents.push_str(input);
        new_contents.push_str("\n\n%%%%\n\n");
        new_contents.push_str(&actual_text);
        new_contents.push('\n');

        new_file.write_all(new_contents.as_bytes()).expect("write to file");

        assert!(false);
    } else {
        assert_eq!(expected_text, actual_text);
    }
}
