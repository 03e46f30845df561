use std::collections::BTreeMap;

use serde_json::Value;

use super::command_registry::{
    CommandSpec, INDEX_COMMANDS, NO_ARG_COMMANDS, SINGLE_PATH_COMMANDS, TEXT_ARG_COMMANDS,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    pub action: String,
    pub raw: String,
    pub command_args: BTreeMap<String, Value>,
}

impl Intent {
    fn new(action: &str, raw: &str) -> Self {
        Self {
            action: action.to_string(),
            raw: raw.to_string(),
            command_args: BTreeMap::new(),
        }
    }

    fn with_arg(mut self, key: &str, value: Value) -> Self {
        self.command_args.insert(key.to_string(), value);
        self
    }
}

fn find_action(command: &str, specs: &[CommandSpec]) -> Option<&'static str> {
    specs
        .iter()
        .find(|spec| spec.command == command)
        .map(|spec| spec.action)
}

fn parse_path_arg(arg: &str) -> String {
    if arg.trim().is_empty() {
        return String::new();
    }
    match shell_words::split(arg) {
        Ok(parts) => parts
            .into_iter()
            .filter(|value| !value.is_empty())
            .collect::<Vec<String>>()
            .join(" "),
        Err(_) => arg.trim().to_string(),
    }
}

// 1-based on the command line for results and gallery entries; catalog ids as-is.
fn parse_index_arg(arg: &str) -> Value {
    arg.trim()
        .parse::<u64>()
        .map(|value| Value::Number(value.into()))
        .unwrap_or(Value::Null)
}

pub fn parse_command(text: &str) -> Intent {
    let raw_trimmed = text.trim();
    if raw_trimmed.is_empty() {
        return Intent::new("noop", text);
    }

    let Some(slash_tail) = raw_trimmed.strip_prefix('/') else {
        return Intent::new("set_pose_text", text)
            .with_arg("text", Value::String(raw_trimmed.to_string()));
    };

    let command_len = slash_tail
        .chars()
        .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        .count();
    if command_len == 0 {
        return Intent::new("unknown", text)
            .with_arg("command", Value::String(String::new()))
            .with_arg("arg", Value::String(slash_tail.trim().to_string()));
    }
    let command = slash_tail[..command_len].to_ascii_lowercase();
    let arg = slash_tail[command_len..].trim();

    if let Some(spec) = TEXT_ARG_COMMANDS.iter().find(|spec| spec.command == command) {
        return Intent::new(spec.action, text).with_arg(spec.key, Value::String(arg.to_string()));
    }

    if let Some(action) = find_action(&command, SINGLE_PATH_COMMANDS) {
        return Intent::new(action, text).with_arg("path", Value::String(parse_path_arg(arg)));
    }

    if let Some(action) = find_action(&command, INDEX_COMMANDS) {
        return Intent::new(action, text)
            .with_arg("index", parse_index_arg(arg))
            .with_arg("arg", Value::String(arg.to_string()));
    }

    if let Some(action) = find_action(&command, NO_ARG_COMMANDS) {
        return Intent::new(action, text);
    }

    Intent::new("unknown", text)
        .with_arg("command", Value::String(command))
        .with_arg("arg", Value::String(arg.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::parse_command;

    #[test]
    fn blank_input_is_noop() {
        assert_eq!(parse_command("   ").action, "noop");
    }

    #[test]
    fn plain_text_sets_pose_description() {
        let intent = parse_command("  walking toward the camera ");
        assert_eq!(intent.action, "set_pose_text");
        assert_eq!(intent.command_args["text"], json!("walking toward the camera"));
    }

    #[test]
    fn path_commands_accept_quoted_paths() {
        let face = parse_command("/face \"/tmp/my face.png\"");
        assert_eq!(face.action, "upload_face");
        assert_eq!(face.command_args["path"], json!("/tmp/my face.png"));

        let product = parse_command("/product shirt.jpg");
        assert_eq!(product.action, "upload_product");
        assert_eq!(product.command_args["path"], json!("shirt.jpg"));

        let background = parse_command("/background_image");
        assert_eq!(background.action, "upload_background");
        assert_eq!(background.command_args["path"], json!(""));
    }

    #[test]
    fn index_commands_parse_numbers() {
        let pose = parse_command("/pose 3");
        assert_eq!(pose.action, "select_pose");
        assert_eq!(pose.command_args["index"], json!(3));

        let variations = parse_command("/variations four");
        assert_eq!(variations.action, "set_variations");
        assert_eq!(variations.command_args["index"], json!(null));
        assert_eq!(variations.command_args["arg"], json!("four"));
    }

    #[test]
    fn text_commands_keep_full_argument() {
        let text = parse_command("/background_text A neon-lit alley, light rain");
        assert_eq!(text.action, "set_background_text");
        assert_eq!(
            text.command_args["text"],
            json!("A neon-lit alley, light rain")
        );

        let mode = parse_command("/POSE_MODE describe");
        assert_eq!(mode.action, "set_pose_mode");
        assert_eq!(mode.command_args["mode"], json!("describe"));
    }

    #[test]
    fn reject_and_change_share_reset_action() {
        assert_eq!(parse_command("/reject").action, "reset_product");
        assert_eq!(parse_command("/change_product").action, "reset_product");
        assert_eq!(parse_command("/approve").action, "approve_product");
    }

    #[test]
    fn unknown_command_reports_name_and_arg() {
        let intent = parse_command("/teleport now");
        assert_eq!(intent.action, "unknown");
        assert_eq!(intent.command_args["command"], json!("teleport"));
        assert_eq!(intent.command_args["arg"], json!("now"));
    }
}
