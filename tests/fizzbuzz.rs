//! Black-box scenario: FizzBuzz from 1 to 15, dispatched through a
//! user-defined `fizzbuzz` method installed on `Number`.

#[test]
fn fizzbuzz_one_to_fifteen() -> anyhow::Result<()> {
    let source = concat!(
        "Number fizzbuzz =\n",
        "    self value % 15 == 0 ifTrue\n",
        "        \"FizzBuzz\" print\n",
        "        return self\n",
        "    self value % 3 == 0 ifTrue\n",
        "        \"Fizz\" print\n",
        "        return self\n",
        "    self value % 5 == 0 ifTrue\n",
        "        \"Buzz\" print\n",
        "        return self\n",
        "    self print\n",
        "    return self\n",
        "i = 1\n",
        "i value <= 15 whileTrue\n",
        "    i fizzbuzz\n",
        "    i value = i value + 1\n",
    );

    let expected = "1\n2\nFizz\n4\nBuzz\nFizz\n7\n8\nFizz\nBuzz\n11\nFizz\n13\n14\nFizzBuzz\n";

    let output = mylang::run_and_capture(source)?;
    assert_eq!(output, expected);
    Ok(())
}
