use interax_prompt_fwk::testing::TestTerminal;
use interax_prompt_fwk::{KeyCode, Validator};
use interax_prompt_widgets::{password, PasswordConfig};

#[tokio::test]
async fn never_echoes_the_secret() {
    let term = TestTerminal::new();
    let session = password()
        .session(PasswordConfig::new("Password"))
        .terminal(term.io())
        .build();

    let (answer, ()) = tokio::join!(session.run(), async {
        term.settle().await;
        term.type_text("hunter2");
        term.settle().await;
        assert_eq!(term.screen(), "? Password [input is masked]");
        term.press(KeyCode::Enter);
    });

    assert_eq!(answer.unwrap(), "hunter2");
    assert_eq!(term.screen(), "✔ Password");
    assert!(!term.raw_output().contains("hunter2"));
}

#[tokio::test]
async fn mask_shows_one_character_per_keystroke() {
    let term = TestTerminal::new();
    let session = password()
        .session(PasswordConfig::new("PIN").mask('*'))
        .terminal(term.io())
        .build();

    let (answer, ()) = tokio::join!(session.run(), async {
        term.settle().await;
        term.type_text("1234");
        term.settle().await;
        assert_eq!(term.screen(), "? PIN ****");
        term.press(KeyCode::Backspace);
        term.settle().await;
        assert_eq!(term.screen(), "? PIN ***");
        term.press(KeyCode::Enter);
    });

    assert_eq!(answer.unwrap(), "123");
    assert_eq!(term.screen(), "✔ PIN ***");
}

#[tokio::test]
async fn validation_errors_show_under_the_prompt() {
    let term = TestTerminal::new();
    let validator = Validator::new(|value| {
        if value.chars().count() >= 8 {
            Ok(())
        } else {
            Err("Use at least 8 characters".to_owned())
        }
    });
    let session = password()
        .session(PasswordConfig::new("Password").mask('•').validate(validator))
        .terminal(term.io())
        .build();

    let (answer, ()) = tokio::join!(session.run(), async {
        term.settle().await;
        term.type_text("short");
        term.press(KeyCode::Enter);
        term.settle().await;
        assert_eq!(
            term.screen(),
            "? Password •••••\n> Use at least 8 characters"
        );

        term.type_text("er-one");
        term.settle().await;
        assert_eq!(term.screen(), "? Password •••••••••••");
        term.press(KeyCode::Enter);
    });

    assert_eq!(answer.unwrap(), "shorter-one");
}
