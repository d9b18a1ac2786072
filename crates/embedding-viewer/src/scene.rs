//! CPU-side scene: the point cloud (once loaded) and the floating label.

use embedding_data::PointCloudBuffer;
use glam::Vec3;

/// Text pinned to a world position, drawn by the overlay pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelPrimitive {
    pub text: String,
    pub anchor: Vec3,
    pub visible: bool,
}

impl LabelPrimitive {
    pub fn show(&mut self, text: &str, anchor: Vec3) {
        self.text.clear();
        self.text.push_str(text);
        self.anchor = anchor;
        self.visible = true;
    }
}

#[derive(Debug, Default)]
pub struct SceneGraph {
    cloud: Option<PointCloudBuffer>,
    pub label: LabelPrimitive,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the point cloud, replacing any previous one.
    pub fn set_cloud(&mut self, cloud: PointCloudBuffer) {
        self.cloud = Some(cloud);
    }

    /// `None` while the dataset is loading or after a failed load.
    #[inline]
    pub fn cloud(&self) -> Option<&PointCloudBuffer> {
        self.cloud.as_ref()
    }

    pub fn point_count(&self) -> usize {
        self.cloud.as_ref().map_or(0, PointCloudBuffer::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_with_hidden_label() {
        let scene = SceneGraph::new();
        assert!(scene.cloud().is_none());
        assert_eq!(scene.point_count(), 0);
        assert!(!scene.label.visible);
    }

    #[test]
    fn show_replaces_text_and_anchor() {
        let mut label = LabelPrimitive::default();
        label.show("/first", Vec3::X);
        label.show("/second", Vec3::Y);
        assert_eq!(label.text, "/second");
        assert_eq!(label.anchor, Vec3::Y);
        assert!(label.visible);
    }
}
