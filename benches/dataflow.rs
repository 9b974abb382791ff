use brilopt::bril::{Code, EffectOpcode, Function, Instruction, Literal, Type, ValueOpcode};
use brilopt::ir::analysis::{compute_dominators, function_reaching_definitions, DominanceKind};
use brilopt::ir::build_blocks;
use brilopt::{Config, WorklistOrder};
use criterion::*;

// `depth` nested counting loops, each updating a few variables.
fn loop_nest(depth: usize) -> Function {
    let mut instrs: Vec<Code> = vec![
        Instruction::constant("one", Type::Int, Literal::Int(1)).into(),
        Instruction::constant("n", Type::Int, Literal::Int(10)).into(),
    ];

    for d in 0..depth {
        let i = format!("i{}", d);
        let c = format!("c{}", d);
        let head = format!("head{}", d);
        let body = format!("body{}", d);
        let exit = format!("exit{}", d);

        instrs.push(Instruction::constant(&i, Type::Int, Literal::Int(0)).into());
        instrs.push(Code::label(&head));
        instrs.push(Instruction::value(ValueOpcode::Lt, &c, Type::Bool, &[i.as_str(), "n"]).into());
        instrs.push(Instruction::effect(EffectOpcode::Br, &[c.as_str()], &[body.as_str(), exit.as_str()]).into());
        instrs.push(Code::label(&body));
        instrs.push(Instruction::value(ValueOpcode::Add, &i, Type::Int, &[i.as_str(), "one"]).into());
    }

    for d in (0..depth).rev() {
        let head = format!("head{}", d);

        instrs.push(Instruction::effect(EffectOpcode::Jmp, &[], &[head.as_str()]).into());
        instrs.push(Code::label(&format!("exit{}", d)));
    }

    instrs.push(Instruction::effect(EffectOpcode::Print, &["one"], &[]).into());

    Function::new("main", instrs)
}

fn dataflow_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("Data Flow");

    for depth in [4, 16, 64] {
        let func = loop_nest(depth);
        let blocks = build_blocks(&func);

        for order in [WorklistOrder::Fifo, WorklistOrder::Dedup] {
            let config = Config {
                worklist: order,
                ..Config::default()
            };

            group.bench_with_input(
                format!("reaching definitions depth {} {:?}", depth, order),
                &func,
                |b, func| b.iter(|| function_reaching_definitions(func, &config).unwrap()),
            );
            group.bench_with_input(
                format!("dominators depth {} {:?}", depth, order),
                &blocks,
                |b, blocks| {
                    b.iter(|| compute_dominators(blocks, DominanceKind::Strict, &config).unwrap())
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, dataflow_throughput);
criterion_main!(benches);
