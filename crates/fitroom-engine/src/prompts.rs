//! Instruction text for every service call.

use fitroom_contracts::assets::ImageData;
use fitroom_contracts::studio::{BackgroundInstruction, GenerationRequest, PoseInstruction};

pub const RENDER_PRODUCT_PROMPT: &str = "Isolate the garment in this photo and re-render it for a virtual try-on. \
Remove the person, hanger, mannequin and any background. Show the garment on a fully transparent \
background as if worn by an invisible mannequin, keeping its true shape, color, fabric texture, \
print and every design detail. Return only the image.";

pub const DESCRIBE_POSE_PROMPT: &str = "Describe the body pose of the person in this image so that another \
model could reproduce it exactly. Cover the head tilt and gaze, torso angle, the position of both \
arms and hands, the stance of both legs and the overall mood. Answer with a single concise \
paragraph of plain text and nothing else.";

pub const POSE_FIELD: &str = "poseDescription";
pub const BACKGROUND_FIELD: &str = "backgroundDescription";

pub fn creative_pose_prompt() -> String {
    format!(
        "You are a fashion photography director. Look at this garment and invent one striking, \
natural and physically plausible model pose that shows it off best. Reply with JSON whose \
`{POSE_FIELD}` field holds a one or two sentence description of the pose."
    )
}

pub fn creative_background_prompt() -> String {
    format!(
        "You are a fashion photography director. Look at this garment and invent one photo \
location that complements its style, colors and mood. Reply with JSON whose \
`{BACKGROUND_FIELD}` field holds a one or two sentence description of the scene."
    )
}

/// Text plus the images it refers to, in the order they must be attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryOnPrompt<'a> {
    pub text: String,
    pub images: Vec<&'a ImageData>,
}

pub fn try_on_prompt(request: &GenerationRequest) -> TryOnPrompt<'_> {
    let mut text = String::from(
        "You are a master digital artist specializing in hyper-realistic virtual try-on photographs. \
Create a single seamless, high-quality photograph that is indistinguishable from a real \
professional photo, with natural posing and physically accurate details.\n\nInputs:",
    );
    let mut images = vec![&request.face, &request.product];
    text.push_str(
        "\n- Image 1 (face): integrate this face onto the model. Match skin tone, texture and \
lighting to the body and keep the expression natural and relaxed.",
    );
    text.push_str(
        "\n- Image 2 (clothing): dress the model in this garment. Respect how the fabric drapes, \
folds and wrinkles on the body so the material looks tangible.",
    );

    match &request.pose {
        PoseInstruction::Reference(image) => {
            images.push(image);
            text.push_str(&format!(
                "\n- Image {} (pose): the model must adopt exactly this body pose.",
                images.len()
            ));
        }
        PoseInstruction::Description(description) => {
            text.push_str(&format!(
                "\n- Pose: \"{description}\". Keep it natural and physically plausible."
            ));
            if request.variation.is_multi() {
                text.push_str(&format!(
                    " This is variation {} of {}. Make this pose unique and distinct from the \
other variations while still matching the description.",
                    request.variation.index, request.variation.total
                ));
            }
        }
    }

    match &request.background {
        Some(BackgroundInstruction::Reference(image)) => {
            images.push(image);
            text.push_str(&format!(
                "\n- Image {} (background): use this image as the background of the scene.",
                images.len()
            ));
        }
        Some(BackgroundInstruction::Description(description)) => {
            text.push_str(&format!("\n- Background: \"{description}\"."));
        }
        None => {
            text.push_str("\n- Background: a neutral, light gray studio setting.");
        }
    }

    text.push_str(
        "\n\nRealism:\n1. Shoot it like a high-end DSLR with a 50mm lens and soft natural light.\n\
2. Keep shadows and highlights consistent across face, body, clothing and background.\n\
3. Avoid airbrushed or overly smooth results. Keep natural skin pores and fabric texture.",
    );

    TryOnPrompt { text, images }
}
