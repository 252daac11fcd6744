use std::time::Duration;

use interax_prompt_fwk::testing::TestTerminal;
use interax_prompt_fwk::{KeyCode, Keybinding, PromptError};
use interax_prompt_widgets::{select, Choice, SelectConfig, SelectItem, Separator};

fn numbers(n: u32) -> Vec<Choice<u32>> {
    (1..=n).map(Choice::from_value).collect()
}

fn fruit() -> Vec<Choice<&'static str>> {
    ["apple", "banana", "blueberry", "cherry"]
        .into_iter()
        .map(Choice::from_value)
        .collect()
}

#[tokio::test]
async fn up_from_the_first_entry_wraps_to_the_last() {
    let term = TestTerminal::new();
    let config = SelectConfig::new("Pick a number", numbers(12));
    let session = select().session(config).terminal(term.io()).build();

    let (answer, ()) = tokio::join!(session.run(), async {
        term.settle().await;
        assert_eq!(
            term.screen(),
            "? Pick a number (Use arrow keys)\n❯ 1\n  2\n  3\n  4\n  5\n  6\n  7\n\
             (Use arrow keys to reveal more choices)"
        );

        term.press(KeyCode::Up);
        term.settle().await;
        assert_eq!(
            term.screen(),
            "? Pick a number\n  9\n  10\n  11\n❯ 12\n  1\n  2\n  3"
        );

        term.press(KeyCode::Enter);
    });

    assert_eq!(answer.unwrap(), 12);
    assert_eq!(term.screen(), "✔ Pick a number 12");
}

#[tokio::test]
async fn skips_separators_and_disabled_entries() {
    let term = TestTerminal::new();
    let choices: Vec<SelectItem<&str>> = vec![
        Choice::new("a", "Alpha").into(),
        Separator::new("--").into(),
        Choice::new("b", "Beta").disabled().into(),
        Choice::new("g", "Gamma").disabled_because("(soon)").into(),
        Choice::new("d", "Delta").into(),
    ];
    let session = select()
        .session(SelectConfig::new("Letter", choices))
        .terminal(term.io())
        .build();

    let (answer, ()) = tokio::join!(session.run(), async {
        term.settle().await;
        assert_eq!(
            term.screen(),
            "? Letter (Use arrow keys)\n❯ Alpha\n --\n  Beta (disabled)\n  Gamma (soon)\n  Delta"
        );
        term.press(KeyCode::Down);
        term.settle().await;
        assert!(term.screen().ends_with("❯ Delta"));
        term.press(KeyCode::Enter);
    });

    assert_eq!(answer.unwrap(), "d");
}

#[tokio::test]
async fn rejects_a_list_without_selectable_entries() {
    let term = TestTerminal::new();
    let choices: Vec<SelectItem<u8>> = vec![
        Separator::default().into(),
        Choice::new(1, "one").disabled().into(),
    ];
    let session = select()
        .session(SelectConfig::new("Nothing", choices))
        .terminal(term.io())
        .build();

    match session.run().await {
        Err(PromptError::Validation(message)) => {
            assert!(message.contains("No selectable choices"), "{message}");
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn starts_on_the_default_value() {
    let term = TestTerminal::new();
    let config = SelectConfig::new("Pick", numbers(5)).default(3);
    let session = select().session(config).terminal(term.io()).build();

    let (answer, ()) = tokio::join!(session.run(), async {
        term.settle().await;
        assert!(term.screen().contains("❯ 3"));
        term.press(KeyCode::Enter);
    });

    assert_eq!(answer.unwrap(), 3);
}

#[tokio::test]
async fn stops_at_the_edges_without_looping() {
    let term = TestTerminal::new();
    let config = SelectConfig::new("Pick", numbers(3)).looping(false);
    let session = select().session(config).terminal(term.io()).build();

    let (answer, ()) = tokio::join!(session.run(), async {
        term.settle().await;
        term.press(KeyCode::Up);
        term.press(KeyCode::Up);
        term.settle().await;
        term.press(KeyCode::Enter);
    });

    assert_eq!(answer.unwrap(), 1);
}

#[tokio::test]
async fn vim_keys_move_when_enabled() {
    let term = TestTerminal::new();
    let config = SelectConfig::new("Pick", numbers(3)).keybindings([Keybinding::Vim]);
    let session = select().session(config).terminal(term.io()).build();

    let (answer, ()) = tokio::join!(session.run(), async {
        term.settle().await;
        term.type_text("jjk");
        term.settle().await;
        term.press(KeyCode::Enter);
    });

    assert_eq!(answer.unwrap(), 2);
}

#[tokio::test]
async fn number_keys_jump_over_unselectable_entries() {
    let term = TestTerminal::new();
    let choices: Vec<SelectItem<&str>> = vec![
        Choice::new("a", "a").into(),
        Separator::default().into(),
        Choice::new("b", "b").disabled().into(),
        Choice::new("c", "c").into(),
    ];
    let session = select()
        .session(SelectConfig::new("Pick", choices))
        .terminal(term.io())
        .build();

    let (answer, ()) = tokio::join!(session.run(), async {
        term.settle().await;
        term.press(KeyCode::Char('2'));
        term.settle().await;
        term.press(KeyCode::Enter);
    });

    assert_eq!(answer.unwrap(), "c");
}

#[tokio::test]
async fn typing_jumps_to_the_first_matching_name() {
    let term = TestTerminal::new();
    let session = select()
        .session(SelectConfig::new("Fruit", fruit()))
        .terminal(term.io())
        .build();

    let (answer, ()) = tokio::join!(session.run(), async {
        term.settle().await;
        term.type_text("b");
        term.settle().await;
        assert!(term.screen().contains("❯ banana"));
        term.type_text("L");
        term.settle().await;
        term.press(KeyCode::Enter);
    });

    assert_eq!(answer.unwrap(), "blueberry");
}

#[tokio::test(start_paused = true)]
async fn typed_search_is_forgotten_after_a_pause() {
    let term = TestTerminal::new();
    let session = select()
        .session(SelectConfig::new("Fruit", fruit()))
        .terminal(term.io())
        .build();

    let (answer, ()) = tokio::join!(session.run(), async {
        term.settle().await;
        term.type_text("b");
        term.settle().await;
        tokio::time::sleep(Duration::from_millis(800)).await;
        term.type_text("c");
        term.settle().await;
        term.press(KeyCode::Enter);
    });

    assert_eq!(answer.unwrap(), "cherry");
}

#[tokio::test]
async fn shows_the_description_and_answers_with_the_short_name() {
    let term = TestTerminal::new();
    let choices = vec![
        Choice::new("node", "Node.js").short("node").description("Server-side JavaScript"),
        Choice::new("deno", "Deno"),
    ];
    let session = select()
        .session(SelectConfig::new("Runtime", choices))
        .terminal(term.io())
        .build();

    let (answer, ()) = tokio::join!(session.run(), async {
        term.settle().await;
        assert!(term.screen().ends_with("  Deno\nServer-side JavaScript"));
        term.press(KeyCode::Enter);
    });

    assert_eq!(answer.unwrap(), "node");
    assert_eq!(term.screen(), "✔ Runtime node");
}

#[tokio::test(start_paused = true)]
async fn cancelling_mid_search_drops_the_reset_timer() {
    let term = TestTerminal::new();
    let session = select()
        .session(SelectConfig::new("Fruit", fruit()))
        .terminal(term.io())
        .build();
    let cancel = session.cancel_handle();

    let (answer, ()) = tokio::join!(session.run(), async {
        term.settle().await;
        term.type_text("c");
        term.settle().await;
        tokio::time::sleep(Duration::from_millis(300)).await;
        cancel.cancel();
    });
    assert!(matches!(answer, Err(PromptError::Cancel)));

    let writes = term.writes();
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(term.writes(), writes);
}
