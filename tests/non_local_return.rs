//! Black-box scenario: a `return` nested inside an `ifTrue` block nested
//! inside a `whileTrue` loop unwinds all the way out to the enclosing
//! method, never running the statements after the loop.

#[test]
fn first_multiple_of_seven_up_to_self() -> anyhow::Result<()> {
    let source = concat!(
        "Number firstDivBy7 =\n",
        "    i = 1\n",
        "    i value <= self value whileTrue\n",
        "        i value % 7 == 0 ifTrue\n",
        "            return i\n",
        "        i value = i value + 1\n",
        "    return 0\n",
        "20 firstDivBy7 print\n",
    );

    let output = mylang::run_and_capture(source)?;
    assert_eq!(output, "7\n");
    Ok(())
}
