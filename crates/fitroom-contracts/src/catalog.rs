//! Fixed pose and background options offered by the studio.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoseEntry {
    pub id: u32,
    pub url: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundEntry {
    pub id: u32,
    pub url: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const POSE_CATALOG: &[PoseEntry] = &[
    PoseEntry {
        id: 1,
        url: "https://picsum.photos/seed/poseA/400/600",
        name: "Classic Stand",
        description: "Standing straight facing the camera, weight evenly balanced, arms relaxed at the sides, calm and confident expression.",
    },
    PoseEntry {
        id: 2,
        url: "https://picsum.photos/seed/poseB/400/600",
        name: "Hand on Hip",
        description: "Standing with the body angled slightly to the left, one hand resting on the hip, the other arm loose, chin lifted with a subtle smile.",
    },
    PoseEntry {
        id: 3,
        url: "https://picsum.photos/seed/poseC/400/600",
        name: "Runway Walk",
        description: "Mid-stride walking toward the camera as on a runway, one foot ahead of the other, arms swinging naturally, focused gaze.",
    },
    PoseEntry {
        id: 4,
        url: "https://picsum.photos/seed/poseD/400/600",
        name: "Over the Shoulder",
        description: "Body turned three-quarters away from the camera, head looking back over the shoulder, relaxed arms, playful expression.",
    },
    PoseEntry {
        id: 5,
        url: "https://picsum.photos/seed/poseE/400/600",
        name: "Casual Lean",
        description: "Leaning casually against an unseen wall, legs crossed at the ankles, hands in pockets, easygoing and relaxed.",
    },
    PoseEntry {
        id: 6,
        url: "https://picsum.photos/seed/poseF/400/600",
        name: "Seated Edge",
        description: "Seated on the edge of a stool, back straight, hands resting on the knees, torso turned slightly toward the camera, composed expression.",
    },
];

pub const BACKGROUND_CATALOG: &[BackgroundEntry] = &[
    BackgroundEntry {
        id: 1,
        url: "https://picsum.photos/seed/bgA/600/400",
        name: "City Street",
        description: "A bustling city street in daylight with softly blurred storefronts and pedestrians.",
    },
    BackgroundEntry {
        id: 2,
        url: "https://picsum.photos/seed/bgB/600/400",
        name: "Beach Sunset",
        description: "A sandy beach at golden hour with warm sunset light and gentle waves.",
    },
    BackgroundEntry {
        id: 3,
        url: "https://picsum.photos/seed/bgC/600/400",
        name: "Modern Loft",
        description: "A bright modern loft interior with large windows, concrete floors and minimal furniture.",
    },
    BackgroundEntry {
        id: 4,
        url: "https://picsum.photos/seed/bgD/600/400",
        name: "Park Path",
        description: "A leafy park path in spring with dappled sunlight through the trees.",
    },
];

pub fn pose_by_id(id: u32) -> Option<&'static PoseEntry> {
    POSE_CATALOG.iter().find(|entry| entry.id == id)
}

pub fn background_by_id(id: u32) -> Option<&'static BackgroundEntry> {
    BACKGROUND_CATALOG.iter().find(|entry| entry.id == id)
}

#[cfg(test)]
mod tests {
    use super::{background_by_id, pose_by_id, BACKGROUND_CATALOG, POSE_CATALOG};

    #[test]
    fn catalog_ids_are_unique_and_described() {
        for (idx, entry) in POSE_CATALOG.iter().enumerate() {
            assert!(!entry.description.trim().is_empty());
            assert!(POSE_CATALOG[idx + 1..].iter().all(|other| other.id != entry.id));
        }
        for (idx, entry) in BACKGROUND_CATALOG.iter().enumerate() {
            assert!(!entry.description.trim().is_empty());
            assert!(BACKGROUND_CATALOG[idx + 1..]
                .iter()
                .all(|other| other.id != entry.id));
        }
    }

    #[test]
    fn lookup_by_id() {
        assert_eq!(pose_by_id(3).map(|entry| entry.name), Some("Runway Walk"));
        assert!(pose_by_id(99).is_none());
        assert_eq!(
            background_by_id(2).map(|entry| entry.name),
            Some("Beach Sunset")
        );
        assert!(background_by_id(0).is_none());
    }
}
