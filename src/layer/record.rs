use super::{LayerId, LayerRecord};

/// Content carried by a layer. Rendering is someone else's job; the editor
/// only needs to name and describe each kind.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerKind {
    /// Pixel data of the given size
    Raster { width: u32, height: u32 },
    /// A text block
    Text { content: String },
    /// Solid RGBA fill covering the canvas
    Fill { color: [u8; 4] },
}

impl LayerKind {
    pub fn label(&self) -> &'static str {
        match self {
            LayerKind::Raster { .. } => "raster",
            LayerKind::Text { .. } => "text",
            LayerKind::Fill { .. } => "fill",
        }
    }

    /// Single-character marker for compact listings
    pub fn glyph(&self) -> char {
        match self {
            LayerKind::Raster { .. } => '▦',
            LayerKind::Text { .. } => 'T',
            LayerKind::Fill { .. } => '■',
        }
    }

    /// Short human-readable summary of the content
    pub fn describe(&self) -> String {
        match self {
            LayerKind::Raster { width, height } => format!("{}x{}", width, height),
            LayerKind::Text { content } => format!("\"{}\"", content),
            LayerKind::Fill { color: [r, g, b, a] } => {
                format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
            }
        }
    }
}

/// Placement of a layer on the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }
}

/// One entry of the render stack
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub kind: LayerKind,
    pub transform: Transform,
    pub opacity: f32,
    pub visible: bool,
    pub selected: bool,
}

impl Layer {
    pub fn new(id: LayerId, name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            transform: Transform::default(),
            opacity: 1.0,
            visible: true,
            selected: false,
        }
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn moved_by(&self, dx: f32, dy: f32) -> Self {
        Self {
            transform: self.transform.translated(dx, dy),
            ..self.clone()
        }
    }
}

impl LayerRecord for Layer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn is_selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    fn duplicate(&self, id: LayerId) -> Self {
        Self { id, ..self.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        assert_eq!(LayerKind::Raster { width: 4, height: 2 }.label(), "raster");
        assert_eq!(LayerKind::Text { content: "hi".to_string() }.label(), "text");
        assert_eq!(LayerKind::Fill { color: [0; 4] }.label(), "fill");
    }

    #[test]
    fn test_kind_describe() {
        assert_eq!(LayerKind::Raster { width: 640, height: 480 }.describe(), "640x480");
        assert_eq!(LayerKind::Text { content: "title".to_string() }.describe(), "\"title\"");
        assert_eq!(
            LayerKind::Fill { color: [255, 0, 16, 128] }.describe(),
            "#ff001080"
        );
    }

    #[test]
    fn test_duplicate_copies_everything_but_id() {
        let layer = Layer::new(LayerId(1), "Sky", LayerKind::Fill { color: [0, 0, 255, 255] })
            .with_selected(true)
            .with_transform(Transform { x: 3.0, ..Transform::default() });
        let copy = layer.duplicate(LayerId(9));

        assert_eq!(copy.id, LayerId(9));
        assert_eq!(copy.name, "Sky");
        assert_eq!(copy.kind, layer.kind);
        assert_eq!(copy.transform, layer.transform);
        assert!(copy.selected);
    }

    #[test]
    fn test_moved_by_keeps_rotation_and_scale() {
        let layer = Layer::new(LayerId(1), "A", LayerKind::Raster { width: 1, height: 1 })
            .with_transform(Transform { x: 1.0, y: 1.0, rotation: 0.5, scale: 2.0 });
        let moved = layer.moved_by(2.0, -1.0);

        assert_eq!(moved.transform, Transform { x: 3.0, y: 0.0, rotation: 0.5, scale: 2.0 });
        assert_eq!(layer.transform.x, 1.0);
    }
}
