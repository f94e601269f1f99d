use indoc::indoc;
use pretty_assertions::assert_eq;
use vmt_sim::{load, Assembler, RunOutcome};

#[test]
fn test_multiply_by_repeated_addition() {
    // R2 = R0 * R1
    let source = indoc! {"
        @R2
        M=0
        (LOOP)
        @R1
        D=M
        @END
        D;JEQ
        @R0
        D=M
        @R2
        M=D+M
        @R1
        M=M-1
        @LOOP
        0;JMP
        (END)
        @END
        0;JMP
    "};
    let mut machine = load(source).unwrap();
    machine.poke(0, 6);
    machine.poke(1, 7);

    assert_eq!(machine.run(10_000), Ok(RunOutcome::Halted));
    assert_eq!(machine.peek(2), 42);
    assert_eq!(machine.peek(1), 0);
}

#[test]
fn test_stack_push_sequence() {
    let source = indoc! {"
        @256
        D=A
        @SP
        M=D
        @17
        D=A
        @SP
        AM=M+1
        A=A-1
        M=D
    "};
    let mut machine = load(source).unwrap();

    assert_eq!(machine.run(100), Ok(RunOutcome::FellThrough));
    assert_eq!(machine.peek(0), 257);
    assert_eq!(machine.peek(256), 17);
}

#[test]
fn test_generated_labels_with_punctuation() {
    let source = "@Main.Foo.bar$ret.0\n0;JMP\n(Main.Foo.bar$ret.0)\n@_END\n0;JMP\n(_END)\n@_END\n0;JMP\n";
    let program = Assembler::new().assemble(source).unwrap();

    assert_eq!(program.symbol("Main.Foo.bar$ret.0"), Some(2));
    assert_eq!(program.symbol("_END"), Some(4));
}
