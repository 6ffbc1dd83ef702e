//! Black-box scenarios for the prototype object model's universal
//! invariants (spec §8): fresh clones, and slot assignment that never
//! mutates the prototype it was read through.

#[test]
fn clone_is_identity_distinct_and_starts_with_no_own_slots() -> anyhow::Result<()> {
    let source = concat!(
        "a = Object clone\n",
        "a greeting = \"hi\"\n",
        "b = a clone\n",
        "(a == b) print\n",
        "(b == b) print\n",
        "b greeting print\n",
    );

    let output = mylang::run_and_capture(source)?;
    assert_eq!(output, "false\ntrue\nhi\n");
    Ok(())
}

#[test]
fn slot_assignment_does_not_mutate_the_prototype() -> anyhow::Result<()> {
    let source = concat!(
        "proto = Object clone\n",
        "proto count = 1\n",
        "child = proto clone\n",
        "child count = 2\n",
        "proto count print\n",
        "child count print\n",
    );

    let output = mylang::run_and_capture(source)?;
    assert_eq!(output, "1\n2\n");
    Ok(())
}

#[test]
fn autoboxed_integer_value_round_trips() -> anyhow::Result<()> {
    let output = mylang::run_and_capture("42 value print\n")?;
    assert_eq!(output, "42\n");
    Ok(())
}
