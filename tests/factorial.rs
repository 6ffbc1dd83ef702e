//! Black-box scenario: recursive factorial via a user-defined method on
//! `Number`, driven entirely through the public `run_and_capture` entry
//! point rather than any internal lexer/parser/eval API.

#[test]
fn fact_of_five_is_120() -> anyhow::Result<()> {
    let source = concat!(
        "Number fact =\n",
        "    self value < 2 ifTrue\n",
        "        return self\n",
        "    return (self value - 1) fact value * self value\n",
        "5 fact print\n",
    );

    let output = mylang::run_and_capture(source)?;
    assert_eq!(output, "120\n");
    Ok(())
}
