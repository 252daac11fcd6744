use interax_prompt_fwk::testing::TestTerminal;
use interax_prompt_fwk::KeyCode;
use interax_prompt_widgets::{confirm, ConfirmConfig};

async fn answer(config: ConfirmConfig, typed: &str) -> (bool, TestTerminal) {
    let term = TestTerminal::new();
    let session = confirm().session(config).terminal(term.io()).build();
    let (answer, ()) = tokio::join!(session.run(), async {
        term.settle().await;
        term.type_text(typed);
        term.settle().await;
        term.press(KeyCode::Enter);
    });
    (answer.unwrap(), term)
}

#[tokio::test]
async fn enter_takes_the_default() {
    let (yes, term) = answer(ConfirmConfig::new("Continue?"), "").await;
    assert!(yes);
    assert_eq!(term.frames()[0], "? Continue? (Y/n)");
    assert_eq!(term.screen(), "✔ Continue? Yes");

    let (yes, term) = answer(ConfirmConfig::new("Continue?").default(false), "").await;
    assert!(!yes);
    assert_eq!(term.frames()[0], "? Continue? (y/N)");
    assert_eq!(term.screen(), "✔ Continue? No");
}

#[tokio::test]
async fn typed_answer_wins_over_the_default() {
    let (yes, term) = answer(ConfirmConfig::new("Continue?"), "no").await;
    assert!(!yes);
    assert!(term.frames().contains(&"? Continue? (Y/n) no".to_owned()));

    let (yes, _) = answer(ConfirmConfig::new("Continue?").default(false), "Y").await;
    assert!(yes);

    let (yes, _) = answer(ConfirmConfig::new("Continue?").default(false), "sure").await;
    assert!(!yes);
}

#[tokio::test]
async fn tab_flips_the_answer() {
    let term = TestTerminal::new();
    let session = confirm()
        .session(ConfirmConfig::new("Continue?"))
        .terminal(term.io())
        .build();
    let (yes, ()) = tokio::join!(session.run(), async {
        term.settle().await;
        term.press(KeyCode::Tab);
        term.settle().await;
        term.press(KeyCode::Enter);
    });
    assert!(!yes.unwrap());
    assert!(term.frames().contains(&"? Continue? (Y/n) No".to_owned()));
}

#[tokio::test]
async fn transformer_formats_the_final_answer() {
    let config = ConfirmConfig::new("Deploy?")
        .transformer(|yes| String::from(if yes { "go" } else { "stop" }));
    let (yes, term) = answer(config, "y").await;
    assert!(yes);
    assert_eq!(term.screen(), "✔ Deploy? go");
}
