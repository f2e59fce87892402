//! Bot API wire types (only the fields desk-guard reads or writes).

use serde::{Deserialize, Serialize};

/// Envelope wrapped around every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

impl User {
    /// The username when set, otherwise the first name.
    pub fn display_name(&self) -> String {
        match &self.username {
            Some(username) => username.clone(),
            None => self.first_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Serialize)]
pub struct GetUpdatesRequest {
    pub offset: i64,
    pub timeout: u64,
    pub allowed_updates: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyboardButton {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
}

impl ReplyKeyboardMarkup {
    pub fn from_rows(rows: &[&[&str]]) -> Self {
        Self {
            keyboard: rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|label| KeyboardButton {
                            text: label.to_string(),
                        })
                        .collect()
                })
                .collect(),
            resize_keyboard: true,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyKeyboardMarkup>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get_updates_response() {
        let json = r#"{
            "ok": true,
            "result": [
                {
                    "update_id": 7001,
                    "message": {
                        "message_id": 12,
                        "from": {"id": 99, "is_bot": false, "first_name": "Ann", "username": "ann"},
                        "chat": {"id": 99, "type": "private"},
                        "date": 1700000000,
                        "text": "Проверка"
                    }
                },
                {
                    "update_id": 7002,
                    "edited_message": {"message_id": 12}
                }
            ]
        }"#;

        let response: ApiResponse<Vec<Update>> = serde_json::from_str(json).unwrap();
        assert!(response.ok);

        let updates = response.result.unwrap();
        assert_eq!(updates.len(), 2);

        let message = updates[0].message.as_ref().unwrap();
        assert_eq!(message.chat.id, 99);
        assert_eq!(message.text.as_deref(), Some("Проверка"));
        assert_eq!(message.from.as_ref().unwrap().display_name(), "ann");

        assert!(updates[1].message.is_none());
    }

    #[test]
    fn test_parse_error_response() {
        let json = r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#;
        let response: ApiResponse<User> = serde_json::from_str(json).unwrap();

        assert!(!response.ok);
        assert!(response.result.is_none());
        assert_eq!(response.error_code, Some(401));
        assert_eq!(response.description.as_deref(), Some("Unauthorized"));
    }

    #[test]
    fn test_send_message_with_keyboard_serializes() {
        let request = SendMessageRequest {
            chat_id: 5,
            text: "hi",
            reply_markup: Some(ReplyKeyboardMarkup::from_rows(&[&["a", "b"], &["c"]])),
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["chat_id"], 5);
        assert_eq!(value["reply_markup"]["keyboard"][0][1]["text"], "b");
        assert_eq!(value["reply_markup"]["keyboard"][1][0]["text"], "c");
    }

    #[test]
    fn test_send_message_without_keyboard_omits_markup() {
        let request = SendMessageRequest {
            chat_id: 5,
            text: "hi",
            reply_markup: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("reply_markup").is_none());
    }
}
