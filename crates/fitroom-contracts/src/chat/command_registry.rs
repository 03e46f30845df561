#[derive(Clone, Copy, Debug)]
pub(crate) struct CommandSpec {
    pub command: &'static str,
    pub action: &'static str,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct TextCommandSpec {
    pub command: &'static str,
    pub action: &'static str,
    pub key: &'static str,
}

pub(crate) const TEXT_ARG_COMMANDS: &[TextCommandSpec] = &[
    TextCommandSpec {
        command: "pose_text",
        action: "set_pose_text",
        key: "text",
    },
    TextCommandSpec {
        command: "background_text",
        action: "set_background_text",
        key: "text",
    },
    TextCommandSpec {
        command: "pose_mode",
        action: "set_pose_mode",
        key: "mode",
    },
    TextCommandSpec {
        command: "background_mode",
        action: "set_background_mode",
        key: "mode",
    },
    TextCommandSpec {
        command: "theme",
        action: "set_theme",
        key: "theme",
    },
];

pub(crate) const SINGLE_PATH_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "face",
        action: "upload_face",
    },
    CommandSpec {
        command: "product",
        action: "upload_product",
    },
    CommandSpec {
        command: "pose_image",
        action: "upload_pose",
    },
    CommandSpec {
        command: "background_image",
        action: "upload_background",
    },
];

pub(crate) const INDEX_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "pose",
        action: "select_pose",
    },
    CommandSpec {
        command: "background",
        action: "select_background",
    },
    CommandSpec {
        command: "variations",
        action: "set_variations",
    },
    CommandSpec {
        command: "save",
        action: "save_result",
    },
    CommandSpec {
        command: "download",
        action: "download_result",
    },
    CommandSpec {
        command: "gallery_delete",
        action: "gallery_delete",
    },
];

pub(crate) const NO_ARG_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "approve",
        action: "approve_product",
    },
    CommandSpec {
        command: "reject",
        action: "reset_product",
    },
    CommandSpec {
        command: "change_product",
        action: "reset_product",
    },
    CommandSpec {
        command: "inspire_pose",
        action: "inspire_pose",
    },
    CommandSpec {
        command: "inspire_background",
        action: "inspire_background",
    },
    CommandSpec {
        command: "generate",
        action: "generate",
    },
    CommandSpec {
        command: "gallery",
        action: "show_gallery",
    },
    CommandSpec {
        command: "gallery_clear",
        action: "gallery_clear",
    },
    CommandSpec {
        command: "poses",
        action: "list_poses",
    },
    CommandSpec {
        command: "backgrounds",
        action: "list_backgrounds",
    },
    CommandSpec {
        command: "status",
        action: "status",
    },
    CommandSpec {
        command: "help",
        action: "help",
    },
    CommandSpec {
        command: "quit",
        action: "quit",
    },
];

pub const STUDIO_HELP_COMMANDS: &[&str] = &[
    "/face <path>",
    "/product <path>",
    "/approve",
    "/reject",
    "/change_product",
    "/pose_mode select|describe|upload",
    "/pose <id>",
    "/pose_text <text>",
    "/pose_image <path>",
    "/background_mode none|select|upload|describe",
    "/background <id>",
    "/background_text <text>",
    "/background_image <path>",
    "/variations <1-4>",
    "/inspire_pose",
    "/inspire_background",
    "/generate",
    "/save <n>",
    "/download <n>",
    "/gallery",
    "/gallery_delete <n>",
    "/gallery_clear",
    "/theme light|dark|toggle",
    "/poses",
    "/backgrounds",
    "/status",
    "/quit",
];
