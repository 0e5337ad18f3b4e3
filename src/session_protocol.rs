use serde_json::Value;

use crate::theme::ThemeMode;
use crate::types::MoveDir;

#[derive(Debug)]
pub enum ParsedClientMessage {
    Hello { name: String },
    Start,
    Restart,
    Move { dir: MoveDir, pressed: bool },
    PauseToggle,
    EnterPocket,
    SelectOption { index: usize },
    SubmitAnswer,
    CancelQuestion,
    LoadDataset { file_name: String, content: String },
    Theme { mode: ThemeMode },
    Ping { t: f64 },
}

pub fn parse_client_message(raw: &str) -> Option<ParsedClientMessage> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let message_type = object.get("type")?.as_str()?;

    match message_type {
        "hello" => {
            let name = object.get("name")?.as_str()?.to_string();
            Some(ParsedClientMessage::Hello { name })
        }
        "start" => Some(ParsedClientMessage::Start),
        "restart" => Some(ParsedClientMessage::Restart),
        "move" => {
            let dir = MoveDir::parse_move(object.get("dir")?.as_str()?)?;
            let pressed = object.get("pressed")?.as_bool()?;
            Some(ParsedClientMessage::Move { dir, pressed })
        }
        "pause_toggle" => Some(ParsedClientMessage::PauseToggle),
        "enter_pocket" => Some(ParsedClientMessage::EnterPocket),
        "select_option" => {
            let index = object.get("index")?.as_u64()?;
            let index = usize::try_from(index).ok()?;
            Some(ParsedClientMessage::SelectOption { index })
        }
        "submit_answer" => Some(ParsedClientMessage::SubmitAnswer),
        "cancel_question" => Some(ParsedClientMessage::CancelQuestion),
        "load_dataset" => {
            let file_name = object.get("fileName")?.as_str()?.to_string();
            let content = object.get("content")?.as_str()?.to_string();
            Some(ParsedClientMessage::LoadDataset { file_name, content })
        }
        "theme" => {
            let mode = ThemeMode::parse(object.get("mode")?.as_str()?)?;
            Some(ParsedClientMessage::Theme { mode })
        }
        "ping" => {
            let t = object.get("t")?.as_f64()?;
            if !t.is_finite() {
                return None;
            }
            Some(ParsedClientMessage::Ping { t })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hello_message() {
        let parsed = parse_client_message(r#"{"type":"hello","name":"Ana"}"#)
            .expect("hello message should parse");
        match parsed {
            ParsedClientMessage::Hello { name } => assert_eq!(name, "Ana"),
            _ => panic!("expected hello message"),
        }
    }

    #[test]
    fn parse_hello_requires_a_name() {
        assert!(parse_client_message(r#"{"type":"hello"}"#).is_none());
        assert!(parse_client_message(r#"{"type":"hello","name":7}"#).is_none());
    }

    #[test]
    fn parse_move_message() {
        let parsed = parse_client_message(r#"{"type":"move","dir":"left","pressed":true}"#)
            .expect("move message should parse");
        assert!(matches!(
            parsed,
            ParsedClientMessage::Move {
                dir: MoveDir::Left,
                pressed: true
            }
        ));
    }

    #[test]
    fn parse_move_rejects_unknown_direction() {
        assert!(parse_client_message(r#"{"type":"move","dir":"up","pressed":true}"#).is_none());
        assert!(parse_client_message(r#"{"type":"move","dir":"left"}"#).is_none());
    }

    #[test]
    fn parse_select_option_message() {
        let parsed = parse_client_message(r#"{"type":"select_option","index":2}"#)
            .expect("select message should parse");
        assert!(matches!(
            parsed,
            ParsedClientMessage::SelectOption { index: 2 }
        ));
    }

    #[test]
    fn parse_select_option_rejects_non_integer_index() {
        assert!(parse_client_message(r#"{"type":"select_option","index":-1}"#).is_none());
        assert!(parse_client_message(r#"{"type":"select_option","index":1.5}"#).is_none());
        assert!(parse_client_message(r#"{"type":"select_option","index":"2"}"#).is_none());
    }

    #[test]
    fn parse_bare_action_messages() {
        assert!(matches!(
            parse_client_message(r#"{"type":"start"}"#),
            Some(ParsedClientMessage::Start)
        ));
        assert!(matches!(
            parse_client_message(r#"{"type":"restart"}"#),
            Some(ParsedClientMessage::Restart)
        ));
        assert!(matches!(
            parse_client_message(r#"{"type":"pause_toggle"}"#),
            Some(ParsedClientMessage::PauseToggle)
        ));
        assert!(matches!(
            parse_client_message(r#"{"type":"enter_pocket"}"#),
            Some(ParsedClientMessage::EnterPocket)
        ));
        assert!(matches!(
            parse_client_message(r#"{"type":"submit_answer"}"#),
            Some(ParsedClientMessage::SubmitAnswer)
        ));
        assert!(matches!(
            parse_client_message(r#"{"type":"cancel_question"}"#),
            Some(ParsedClientMessage::CancelQuestion)
        ));
    }

    #[test]
    fn parse_load_dataset_message() {
        let parsed = parse_client_message(
            r#"{"type":"load_dataset","fileName":"quiz.csv","content":"Q?,A;B,0"}"#,
        )
        .expect("load message should parse");
        match parsed {
            ParsedClientMessage::LoadDataset { file_name, content } => {
                assert_eq!(file_name, "quiz.csv");
                assert_eq!(content, "Q?,A;B,0");
            }
            _ => panic!("expected load_dataset message"),
        }
    }

    #[test]
    fn parse_theme_message() {
        let parsed = parse_client_message(r#"{"type":"theme","mode":"dark"}"#)
            .expect("theme message should parse");
        assert!(matches!(
            parsed,
            ParsedClientMessage::Theme {
                mode: ThemeMode::Dark
            }
        ));
        assert!(parse_client_message(r#"{"type":"theme","mode":"sepia"}"#).is_none());
    }

    #[test]
    fn parse_ping_requires_finite_number() {
        assert!(matches!(
            parse_client_message(r#"{"type":"ping","t":12.5}"#),
            Some(ParsedClientMessage::Ping { .. })
        ));
        assert!(parse_client_message(r#"{"type":"ping","t":"soon"}"#).is_none());
    }

    #[test]
    fn unknown_or_malformed_messages_are_rejected() {
        assert!(parse_client_message("not json").is_none());
        assert!(parse_client_message("[1,2,3]").is_none());
        assert!(parse_client_message(r#"{"type":"warp"}"#).is_none());
    }
}
