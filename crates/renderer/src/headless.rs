//! Headless graphics context: hands out sequential ids and records what was
//! asked of it. Used by the inspector binary and by tests.

use asset::{Attribute, TextureData, VertexAttributes};
use parking_lot::Mutex;

use crate::gfx::{GraphicsContext, TextureSource};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferSetId(pub u32);

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedTexture {
    pub source: TextureSource,
    /// Last pixels uploaded after creation, if any.
    pub uploaded: Option<TextureData>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedAttribute {
    pub name: &'static str,
    pub components: u32,
    pub constant: bool,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedBuffers {
    pub vertex_count: usize,
    pub attributes: Vec<RecordedAttribute>,
}

impl RecordedBuffers {
    pub fn attribute(&self, name: &str) -> Option<&RecordedAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

#[derive(Default)]
pub struct HeadlessContext {
    textures: Mutex<Vec<RecordedTexture>>,
    buffers: Mutex<Vec<RecordedBuffers>>,
}

impl HeadlessContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn textures(&self) -> Vec<RecordedTexture> {
        self.textures.lock().clone()
    }

    pub fn texture(&self, id: TextureId) -> Option<RecordedTexture> {
        self.textures.lock().get(id.0 as usize).cloned()
    }

    pub fn buffers(&self) -> Vec<RecordedBuffers> {
        self.buffers.lock().clone()
    }
}

impl GraphicsContext for HeadlessContext {
    type Texture = TextureId;
    type Buffers = BufferSetId;

    fn create_texture(&self, source: TextureSource) -> TextureId {
        let mut textures = self.textures.lock();
        textures.push(RecordedTexture {
            source,
            uploaded: None,
        });
        TextureId(textures.len() as u32 - 1)
    }

    fn upload_texture(&self, texture: &TextureId, pixels: TextureData) {
        match self.textures.lock().get_mut(texture.0 as usize) {
            Some(recorded) => recorded.uploaded = Some(pixels),
            None => log::warn!("upload to unknown texture {:?}", texture),
        }
    }

    fn create_vertex_buffers(&self, attributes: &VertexAttributes) -> BufferSetId {
        let recorded = RecordedBuffers {
            vertex_count: attributes.vertex_count,
            attributes: attributes
                .named()
                .into_iter()
                .map(|(name, attr)| RecordedAttribute {
                    name,
                    components: attr.components(),
                    constant: matches!(attr, Attribute::Constant { .. }),
                    bytes: bytemuck::cast_slice::<f32, u8>(attr.values()).to_vec(),
                })
                .collect(),
        };
        let mut buffers = self.buffers.lock();
        buffers.push(recorded);
        BufferSetId(buffers.len() as u32 - 1)
    }
}
