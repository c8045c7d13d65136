use crate::{BufferView, Sampler, TextureView};

bitflags::bitflags! {
    pub struct ShaderStageFlags: u32 {
        const VERTEX = 0x0001;
        const FRAGMENT = 0x0002;
        const COMPUTE = 0x0004;
        const ALL_GRAPHICS = Self::VERTEX.bits | Self::FRAGMENT.bits;
        const ALL = Self::VERTEX.bits | Self::FRAGMENT.bits | Self::COMPUTE.bits;
    }
}

impl Default for ShaderStageFlags {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(feature = "serde-support")]
impl serde::Serialize for ShaderStageFlags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

#[cfg(feature = "serde-support")]
impl<'de> serde::Deserialize<'de> for ShaderStageFlags {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = <u32 as serde::Deserialize<'de>>::deserialize(deserializer)?;
        Self::from_bits(bits)
            .ok_or_else(|| serde::de::Error::custom("invalid shader stage flag bits"))
    }
}

/// The kind of shader-visible resource a descriptor slot holds. Matches the
/// descriptor types reported by SPIR-V reflection one to one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum ShaderResourceType {
    Sampler,
    CombinedImageSampler,
    SampledImage,
    StorageImage,
    UniformBuffer,
    StorageBuffer,
}

impl ShaderResourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sampler => "Sampler",
            Self::CombinedImageSampler => "CombinedImageSampler",
            Self::SampledImage => "SampledImage",
            Self::StorageImage => "StorageImage",
            Self::UniformBuffer => "UniformBuffer",
            Self::StorageBuffer => "StorageBuffer",
        }
    }
}

/// A concrete resource reference to be written into one descriptor slot.
/// The referenced views are created by the memory/texture collaborators and
/// only borrowed for the duration of the write.
#[derive(Clone, Copy)]
pub enum DescriptorRef<'a> {
    Sampler(&'a Sampler),
    BufferView(&'a BufferView),
    TextureView(&'a TextureView),
    CombinedImageSampler(&'a TextureView, &'a Sampler),
}

impl<'a> DescriptorRef<'a> {
    /// Whether this reference can legally be written into a slot of the
    /// given resource type.
    pub(crate) fn is_compatible_with(&self, shader_resource_type: ShaderResourceType) -> bool {
        match self {
            Self::Sampler(_) => shader_resource_type == ShaderResourceType::Sampler,
            Self::BufferView(_) => matches!(
                shader_resource_type,
                ShaderResourceType::UniformBuffer | ShaderResourceType::StorageBuffer
            ),
            Self::TextureView(_) => matches!(
                shader_resource_type,
                ShaderResourceType::SampledImage | ShaderResourceType::StorageImage
            ),
            Self::CombinedImageSampler(_, _) => {
                shader_resource_type == ShaderResourceType::CombinedImageSampler
            }
        }
    }
}
