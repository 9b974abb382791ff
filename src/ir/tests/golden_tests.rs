use super::test_golden_text;

#[test]
fn lvn_redundant_add() {
    test_golden_text("src/ir/tests/golden/lvn_redundant_add.txt");
}

#[test]
fn lvn_commutative() {
    test_golden_text("src/ir/tests/golden/lvn_commutative.txt");
}

#[test]
fn dce_dead_chain() {
    test_golden_text("src/ir/tests/golden/dce_dead_chain.txt");
}

#[test]
fn lvn_then_dce_branches() {
    test_golden_text("src/ir/tests/golden/lvn_then_dce_branches.txt");
}

#[test]
fn no_flags_round_trip() {
    test_golden_text("src/ir/tests/golden/round_trip.txt");
}
