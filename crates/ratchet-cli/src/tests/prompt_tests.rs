use std::io::Cursor;

use super::prompt::confirm;

fn ask(answers: &str, default: bool) -> (bool, String) {
    let mut input = Cursor::new(answers.as_bytes().to_vec());
    let mut output = Vec::new();
    let answer = confirm("Continue?", default, &mut input, &mut output).unwrap();
    (answer, String::from_utf8(output).unwrap())
}

#[test]
fn accepts_yes_and_no() {
    assert!(ask("y\n", false).0);
    assert!(ask("YES\n", false).0);
    assert!(!ask("n\n", true).0);
    assert!(!ask("no\n", true).0);
}

#[test]
fn empty_answer_uses_default() {
    assert!(!ask("\n", false).0);
    assert!(ask("\n", true).0);
}

#[test]
fn end_of_input_uses_default() {
    let (answer, output) = ask("", false);
    assert!(!answer);
    assert_eq!(output, "Continue? (y/N) \n");
}

#[test]
fn shows_default_in_hint() {
    assert!(ask("y\n", true).1.starts_with("Continue? (Y/n) "));
    assert!(ask("y\n", false).1.starts_with("Continue? (y/N) "));
}

#[test]
fn asks_again_after_unrecognised_answer() {
    let (answer, output) = ask("maybe\ny\n", false);
    assert!(answer);
    assert_eq!(
        output,
        "Continue? (y/N) Please answer 'y' or 'n'.\nContinue? (y/N) "
    );
}
