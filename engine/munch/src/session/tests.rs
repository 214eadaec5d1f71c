#![allow(
    clippy::unwrap_used,
    reason = "test assertions use unwrap for clarity"
)]

use super::*;
use crate::error::{LimitError, SessionError};
use crate::grammar::LimitDef;
use munch_core::TokenDef;
use pretty_assertions::assert_eq;

fn they_grammar() -> Grammar {
    Grammar::from_literals(["the", "they", "theyare"]).unwrap()
}

/// Committed tokens with their surrounding text, as
/// `(leading, literal, token)` triples plus the trailing text.
fn transcript(grammar: &Grammar, input: &str) -> (Vec<(String, String, TokenId)>, String) {
    let mut session = Session::new(grammar);
    session.set_input(input);
    let mut tokens = Vec::new();
    let mut trailing = String::new();
    for checkpoint in session.run_to_completion().unwrap() {
        match checkpoint {
            Checkpoint::TokenProcessed(event) => tokens.push((
                session.input_slice(event.leading).unwrap().to_owned(),
                session.input_slice(event.span).unwrap().to_owned(),
                event.token,
            )),
            Checkpoint::End { trailing: span, .. } => {
                trailing = session.input_slice(span).unwrap().to_owned();
            }
            _ => {}
        }
    }
    (tokens, trailing)
}

// === Scenarios ===

#[test]
fn they_followed_by_break() {
    let grammar = they_grammar();
    let mut session = Session::new(&grammar);
    session.set_input("they are");

    assert_eq!(session.step().unwrap(), Checkpoint::Start);

    let expected = TokenEvent {
        token: TokenId::new(1),
        span: Span::new(0, 4),
        leading: Span::new(0, 0),
        limit_depth: 0,
    };
    assert_eq!(session.step().unwrap(), Checkpoint::BeforeToken(expected));
    assert_eq!(session.step().unwrap(), Checkpoint::TokenProcessed(expected));
    assert_eq!(
        session.step().unwrap(),
        Checkpoint::End {
            trailing: Span::new(4, 8),
            limit_depth: 0
        }
    );
    assert_eq!(session.input_slice(Span::new(4, 8)), Some(" are"));
    assert_eq!(session.step().unwrap(), Checkpoint::Stopped);
}

#[test]
fn longest_match_wins_whole_input() {
    let grammar = they_grammar();
    let (tokens, trailing) = transcript(&grammar, "theyare");
    assert_eq!(
        tokens,
        vec![(String::new(), "theyare".to_owned(), TokenId::new(2))]
    );
    assert_eq!(trailing, "");
}

#[test]
fn mixed_prefixes_and_leading_text() {
    let grammar = they_grammar();
    let (tokens, trailing) = transcript(&grammar, "AtheBtheyCtheyarDtheyareE");
    assert_eq!(
        tokens,
        vec![
            ("A".to_owned(), "the".to_owned(), TokenId::new(0)),
            ("B".to_owned(), "they".to_owned(), TokenId::new(1)),
            // "theyare" speculation breaks at 'D'; the completed "they"
            // is accepted and the speculated tail rescans into leading.
            ("C".to_owned(), "they".to_owned(), TokenId::new(1)),
            ("arD".to_owned(), "theyare".to_owned(), TokenId::new(2)),
        ]
    );
    assert_eq!(trailing, "E");
}

#[test]
fn prefix_is_never_missed() {
    // For every proper prefix that is itself a token, a break byte after
    // the prefix still yields the prefix.
    let grammar = they_grammar();
    let (tokens, trailing) = transcript(&grammar, "theX");
    assert_eq!(tokens, vec![(String::new(), "the".to_owned(), TokenId::new(0))]);
    assert_eq!(trailing, "X");

    let (tokens, trailing) = transcript(&grammar, "theyX");
    assert_eq!(
        tokens,
        vec![(String::new(), "they".to_owned(), TokenId::new(1))]
    );
    assert_eq!(trailing, "X");
}

#[test]
fn empty_input_fires_start_end_stop() {
    let grammar = they_grammar();
    let mut session = Session::new(&grammar);
    session.set_input("");
    assert_eq!(
        session.run_to_completion().unwrap(),
        vec![
            Checkpoint::Start,
            Checkpoint::End {
                trailing: Span::new(0, 0),
                limit_depth: 0
            },
            Checkpoint::Stopped,
        ]
    );
}

#[test]
fn input_with_no_matches_is_all_trailing() {
    let grammar = they_grammar();
    let (tokens, trailing) = transcript(&grammar, "no matches here");
    assert_eq!(tokens, vec![]);
    assert_eq!(trailing, "no matches here");
}

#[test]
fn tokens_straddling_interior_nulls() {
    let grammar = they_grammar();
    let (tokens, trailing) = transcript(&grammar, "\0the\0");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].0, "\0");
    assert_eq!(tokens[0].1, "the");
    assert_eq!(trailing, "\0");
}

// === Session state errors ===

#[test]
fn step_without_input_fails() {
    let grammar = they_grammar();
    let mut session = Session::new(&grammar);
    assert_eq!(session.step().unwrap_err(), SessionError::NoInputSet);
}

#[test]
fn step_after_stopped_fails() {
    let grammar = they_grammar();
    let mut session = Session::new(&grammar);
    session.set_input("x");
    session.run_to_completion().unwrap();
    assert_eq!(session.step().unwrap_err(), SessionError::AlreadyStopped);
}

#[test]
fn stop_forces_terminal_state() {
    let grammar = they_grammar();
    let mut session = Session::new(&grammar);
    session.set_input("they are");
    session.step().unwrap(); // Start
    session.stop();
    assert_eq!(session.step().unwrap_err(), SessionError::AlreadyStopped);
    assert_eq!(session.input_slice(Span::new(0, 1)), None);
}

#[test]
fn set_input_revives_a_stopped_session() {
    let grammar = they_grammar();
    let mut session = Session::new(&grammar);
    session.set_input("they");
    session.run_to_completion().unwrap();

    session.set_input("the");
    let checkpoints = session.run_to_completion().unwrap();
    assert_eq!(checkpoints.len(), 5); // Start, Before, Processed, End, Stopped
    assert_eq!(session.last_token().unwrap().token, TokenId::new(0));
}

#[test]
fn set_input_resets_scan_state_and_limits() {
    let grammar = Grammar::compile(
        vec![TokenDef::new(0, "a"), TokenDef::new(1, "b")],
        vec![LimitDef::new("only-a", [0])],
    )
    .unwrap();
    let mut session = Session::new(&grammar);
    session.set_input("ab");
    session.step().unwrap(); // Start
    session.enter_limit("only-a").unwrap();
    assert_eq!(session.limit_depth(), 1);

    session.set_input("ab");
    assert_eq!(session.limit_depth(), 0);
    // Both tokens match again: the limit is gone.
    let mut committed = Vec::new();
    for checkpoint in session.run_to_completion().unwrap() {
        if let Checkpoint::TokenProcessed(event) = checkpoint {
            committed.push(event.token);
        }
    }
    assert_eq!(committed, vec![TokenId::new(0), TokenId::new(1)]);
}

// === Rejection ===

#[test]
fn rejected_token_becomes_leading_text() {
    let grammar = they_grammar();
    let mut session = Session::new(&grammar);
    session.set_input("they are");
    session.step().unwrap(); // Start
    let checkpoint = session.step().unwrap();
    assert!(matches!(checkpoint, Checkpoint::BeforeToken(_)));
    session.reject_token().unwrap();

    // No TokenProcessed; the whole input flushes as trailing text.
    assert_eq!(
        session.step().unwrap(),
        Checkpoint::End {
            trailing: Span::new(0, 8),
            limit_depth: 0
        }
    );
    assert!(session.last_token().is_none());
}

#[test]
fn scanning_continues_after_rejection() {
    let grammar = Grammar::from_literals(["ab"]).unwrap();
    let mut session = Session::new(&grammar);
    session.set_input("abab");
    session.step().unwrap(); // Start
    session.step().unwrap(); // BeforeToken ab@0..2
    session.reject_token().unwrap();

    // Next resolved token starts after the rejected span, which is now
    // part of its leading text.
    let expected = TokenEvent {
        token: TokenId::new(0),
        span: Span::new(2, 4),
        leading: Span::new(0, 2),
        limit_depth: 0,
    };
    assert_eq!(session.step().unwrap(), Checkpoint::BeforeToken(expected));
    assert_eq!(session.step().unwrap(), Checkpoint::TokenProcessed(expected));
}

#[test]
fn reject_outside_before_token_fails() {
    let grammar = they_grammar();
    let mut session = Session::new(&grammar);
    session.set_input("they");
    assert_eq!(session.reject_token().unwrap_err(), SessionError::NotAtToken);
    session.step().unwrap(); // Start
    assert_eq!(session.reject_token().unwrap_err(), SessionError::NotAtToken);
    session.stop();
    assert_eq!(
        session.reject_token().unwrap_err(),
        SessionError::AlreadyStopped
    );
}

// === Limits ===

fn limited_grammar() -> Grammar {
    Grammar::compile(
        vec![
            TokenDef::new(0, "the"),
            TokenDef::new(1, "they"),
            TokenDef::new(2, "theyare"),
        ],
        vec![LimitDef::new("short", [0, 1])],
    )
    .unwrap()
}

#[test]
fn limit_excludes_tokens_from_matching() {
    let grammar = limited_grammar();
    let mut session = Session::new(&grammar);
    session.set_input("theyare");
    session.step().unwrap(); // Start
    session.enter_limit("short").unwrap();

    // "theyare" is textually present but excluded; "they" wins instead
    // and the tail never matches.
    let before = session.step().unwrap();
    let event = *before.token_event().unwrap();
    assert_eq!(event.token, TokenId::new(1));
    assert_eq!(event.span, Span::new(0, 4));
    assert_eq!(event.limit_depth, 1);

    session.step().unwrap(); // TokenProcessed
    assert_eq!(
        session.step().unwrap(),
        Checkpoint::End {
            trailing: Span::new(4, 7),
            limit_depth: 1
        }
    );
}

#[test]
fn limit_entered_mid_scan_applies_from_commit_point() {
    let grammar = Grammar::compile(
        vec![TokenDef::new(0, "ab"), TokenDef::new(1, "cd")],
        vec![LimitDef::new("only-ab", [0])],
    )
    .unwrap();
    let mut session = Session::new(&grammar);
    session.set_input("abcd");
    session.step().unwrap(); // Start
    session.step().unwrap(); // BeforeToken ab@0..2
    session.enter_limit("only-ab").unwrap();
    session.step().unwrap(); // TokenProcessed ab

    // "cd" is excluded from here on.
    assert_eq!(
        session.step().unwrap(),
        Checkpoint::End {
            trailing: Span::new(2, 4),
            limit_depth: 1
        }
    );
}

#[test]
fn exit_limit_restores_matching() {
    let grammar = Grammar::compile(
        vec![TokenDef::new(0, "ab"), TokenDef::new(1, "cd")],
        vec![LimitDef::new("only-ab", [0])],
    )
    .unwrap();
    let mut session = Session::new(&grammar);
    session.set_input("cdab cd");
    session.step().unwrap(); // Start
    session.enter_limit("only-ab").unwrap();

    // First match under the limit skips "cd".
    let event = *session.step().unwrap().token_event().unwrap();
    assert_eq!(event.token, TokenId::new(0));
    assert_eq!(event.span, Span::new(2, 4));
    session.exit_limit(1).unwrap();
    session.step().unwrap(); // TokenProcessed

    // With the limit gone, the trailing "cd" matches.
    let event = *session.step().unwrap().token_event().unwrap();
    assert_eq!(event.token, TokenId::new(1));
    assert_eq!(event.span, Span::new(5, 7));
    assert_eq!(event.limit_depth, 0);
}

#[test]
fn limit_errors_leave_session_unchanged() {
    let grammar = limited_grammar();
    let mut session = Session::new(&grammar);
    session.set_input("they");
    session.step().unwrap(); // Start

    assert_eq!(
        session.enter_limit("missing").unwrap_err(),
        LimitError::UnknownLimit {
            name: "missing".into()
        }
    );
    assert_eq!(
        session.exit_limit(1).unwrap_err(),
        LimitError::Underflow {
            requested: 1,
            depth: 0
        }
    );
    assert_eq!(session.limit_depth(), 0);

    // Scanning proceeds as if nothing happened.
    let event = *session.step().unwrap().token_event().unwrap();
    assert_eq!(event.token, TokenId::new(1));
}

// === Bookkeeping ===

#[test]
fn last_and_previous_token_track_commits() {
    let grammar = Grammar::from_literals(["ab", "cd"]).unwrap();
    let mut session = Session::new(&grammar);
    session.set_input("ab-cd");
    session.step().unwrap(); // Start
    assert!(session.last_token().is_none());

    session.step().unwrap(); // BeforeToken ab
    assert!(session.last_token().is_none(), "uncommitted match is not last");
    session.step().unwrap(); // TokenProcessed ab
    assert_eq!(session.last_token().unwrap().token, TokenId::new(0));
    assert!(session.previous_token().is_none());

    session.step().unwrap(); // BeforeToken cd
    session.step().unwrap(); // TokenProcessed cd
    assert_eq!(session.last_token().unwrap().token, TokenId::new(1));
    assert_eq!(session.previous_token().unwrap().token, TokenId::new(0));
}

#[test]
fn determinism_same_script_same_checkpoints() {
    let grammar = limited_grammar();
    let run = || {
        let mut session = Session::new(&grammar);
        session.set_input("the theyare they");
        let mut seen = Vec::new();
        loop {
            let checkpoint = session.step().unwrap();
            // Scripted host: enter the limit at the first BeforeToken.
            if matches!(checkpoint, Checkpoint::BeforeToken(_)) && seen.len() == 1 {
                session.enter_limit("short").unwrap();
            }
            let done = checkpoint.is_terminal();
            seen.push(checkpoint);
            if done {
                return seen;
            }
        }
    };
    assert_eq!(run(), run());
}

// === Total coverage ===

mod proptest_coverage {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // The concatenation of leading spans, token spans, and the
        // trailing span exactly reconstructs the input.
        #[test]
        fn spans_reconstruct_input(input in "[theyarX ]{0,48}") {
            let grammar = they_grammar();
            let mut session = Session::new(&grammar);
            session.set_input(&input);
            let mut rebuilt = String::new();
            for checkpoint in session.run_to_completion().unwrap() {
                match checkpoint {
                    Checkpoint::TokenProcessed(event) => {
                        rebuilt.push_str(session.input_slice(event.leading).unwrap());
                        rebuilt.push_str(session.input_slice(event.span).unwrap());
                    }
                    Checkpoint::End { trailing, .. } => {
                        rebuilt.push_str(session.input_slice(trailing).unwrap());
                    }
                    _ => {}
                }
            }
            prop_assert_eq!(rebuilt, input);
        }

        // Committed literals always appear verbatim at their spans.
        #[test]
        fn committed_spans_carry_their_literals(input in "[theyar ]{0,32}") {
            let grammar = they_grammar();
            let mut session = Session::new(&grammar);
            session.set_input(&input);
            for checkpoint in session.run_to_completion().unwrap() {
                if let Checkpoint::TokenProcessed(event) = checkpoint {
                    let text = session.input_slice(event.span).unwrap();
                    prop_assert_eq!(text, grammar.table().literal(event.token));
                }
            }
        }
    }
}
