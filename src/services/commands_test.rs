use super::*;

#[test]
fn plain_text_is_sent_verbatim() {
    assert_eq!(parse_input("hello"), Input::Send("hello".into()));
    assert_eq!(parse_input("  spaced out  "), Input::Send("  spaced out  ".into()));
    assert_eq!(parse_input("~bonk @bob"), Input::Send("~bonk @bob".into()));
}

#[test]
fn blank_lines_are_empty() {
    assert_eq!(parse_input(""), Input::Empty);
    assert_eq!(parse_input("   \t"), Input::Empty);
}

#[test]
fn known_commands_parse() {
    assert_eq!(parse_input("/logout"), Input::Local(LocalCommand::Logout));
    assert_eq!(parse_input("  /clear  "), Input::Local(LocalCommand::Clear));
    assert_eq!(parse_input("/help"), Input::Local(LocalCommand::Help));
    assert_eq!(parse_input("/color red"), Input::Local(LocalCommand::Color("red".into())));
    assert_eq!(parse_input("/color   #ff8800 "), Input::Local(LocalCommand::Color("#ff8800".into())));
}

#[test]
fn color_value_is_the_whole_remainder() {
    assert_eq!(
        parse_input("/color rgb(255, 0, 0)"),
        Input::Local(LocalCommand::Color("rgb(255, 0, 0)".into()))
    );
    assert_eq!(
        parse_input("/color  hsl(120, 100%, 25%)  "),
        Input::Local(LocalCommand::Color("hsl(120, 100%, 25%)".into()))
    );
}

#[test]
fn malformed_or_unknown_commands_are_invalid() {
    assert_eq!(parse_input("/dance"), Input::Local(LocalCommand::Invalid("dance".into())));
    assert_eq!(parse_input("/color"), Input::Local(LocalCommand::Invalid("color".into())));
    assert_eq!(parse_input("/logout now"), Input::Local(LocalCommand::Invalid("logout now".into())));
    assert_eq!(parse_input("/"), Input::Local(LocalCommand::Invalid(String::new())));
}

#[test]
fn help_lists_every_command() {
    for name in ["/logout", "/clear", "/color", "/help"] {
        assert!(HELP_TEXT.contains(name), "help text missing {name}");
    }
}

#[test]
fn color_confirmation_names_value() {
    assert_eq!(color_confirmation("red"), "Changed color to red");
}
