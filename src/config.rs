use clap::{Parser, ValueEnum};

/// Order in which the data-flow engine takes nodes off its worklist.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorklistOrder {
    /// First in, first out. A node may be queued more than once.
    #[default]
    Fifo,
    /// First in, first out, but a node already waiting is not queued again.
    Dedup,
}

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Worklist discipline used by the data-flow engine
    #[arg(long, value_enum, default_value_t = WorklistOrder::Fifo)]
    pub worklist: WorklistOrder,

    /// Sort the operands of commutative operations before value numbering
    #[arg(long)]
    pub commutative_lvn: bool,

    /// Stop dead code elimination after this many passes per function
    #[arg(long)]
    pub max_dce_passes: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worklist: WorklistOrder::Fifo,
            commutative_lvn: false,
            max_dce_passes: None,
        }
    }
}

impl<'a> TryFrom<Vec<&'a str>> for Config {
    type Error = clap::Error;

    fn try_from(args: Vec<&'a str>) -> Result<Self, Self::Error> {
        Config::try_parse_from(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let config = Config::try_from(vec![
            "brilopt",
            "--worklist",
            "dedup",
            "--commutative-lvn",
            "--max-dce-passes",
            "3",
        ])
        .unwrap();

        assert_eq!(WorklistOrder::Dedup, config.worklist);
        assert!(config.commutative_lvn);
        assert_eq!(Some(3), config.max_dce_passes);
    }

    #[test]
    fn no_flags_is_default() {
        let config = Config::try_from(vec!["brilopt"]).unwrap();

        assert_eq!(Config::default(), config);
    }

    #[test]
    fn rejects_unknown_worklist() {
        assert!(Config::try_from(vec!["brilopt", "--worklist", "lifo"]).is_err());
    }
}
