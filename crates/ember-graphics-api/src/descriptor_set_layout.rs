use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::{
    backends::BackendDescriptorSetLayout, DeviceContext, GfxResult, ShaderResourceType,
    ShaderStageFlags, MAX_DESCRIPTOR_BINDINGS,
};

static NEXT_DESCRIPTOR_SET_LAYOUT_ID: std::sync::atomic::AtomicU32 =
    std::sync::atomic::AtomicU32::new(1);

/// One slot of a descriptor-set layout. Equality and hashing cover exactly
/// the fields that matter on the wire, so two declaration lists that differ
/// only in element-count normalization or declaration order resolve to the
/// same layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DescriptorBindingDef {
    pub binding: u32,
    pub shader_resource_type: ShaderResourceType,
    pub element_count: u32,
    pub used_in_shader_stages: ShaderStageFlags,
}

impl DescriptorBindingDef {
    pub fn new(
        binding: u32,
        shader_resource_type: ShaderResourceType,
        used_in_shader_stages: ShaderStageFlags,
    ) -> Self {
        Self {
            binding,
            shader_resource_type,
            element_count: 1,
            used_in_shader_stages,
        }
    }

    pub fn element_count_normalized(&self) -> u32 {
        // Assume 0 = default of 1
        self.element_count.max(1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DescriptorSetLayoutDef {
    pub bindings: Vec<DescriptorBindingDef>,
}

impl DescriptorSetLayoutDef {
    pub fn new(bindings: Vec<DescriptorBindingDef>) -> Self {
        Self { bindings }
    }

    /// Canonical form: bindings sorted by slot index, element counts
    /// normalized. Declaring the same slot twice is a caller contract
    /// violation.
    pub(crate) fn normalized(&self) -> Self {
        let mut bindings = self.bindings.clone();
        for binding in &mut bindings {
            binding.element_count = binding.element_count_normalized();
        }
        bindings.sort_by_key(|b| b.binding);
        debug_assert!(
            bindings.windows(2).all(|w| w[0].binding != w[1].binding),
            "duplicate binding slot in descriptor set layout definition"
        );
        Self { bindings }
    }
}

pub(crate) struct DescriptorSetLayoutInner {
    device_context: DeviceContext,
    id: u32,
    bindings: Vec<DescriptorBindingDef>,
    binding_mask: u64,

    pub(crate) backend_layout: BackendDescriptorSetLayout,
}

impl Drop for DescriptorSetLayoutInner {
    fn drop(&mut self) {
        self.backend_layout.destroy(&self.device_context);
    }
}

/// A created, shareable descriptor-set layout. Clones share one backend
/// handle; the layout cache guarantees at most one of these exists per
/// distinct normalized definition.
#[derive(Clone)]
pub struct DescriptorSetLayout {
    pub(crate) inner: Arc<DescriptorSetLayoutInner>,
}

impl std::fmt::Debug for DescriptorSetLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorSetLayout")
            .field("id", &self.inner.id)
            .field("bindings", &self.inner.bindings)
            .finish()
    }
}

impl DescriptorSetLayout {
    pub fn device_context(&self) -> &DeviceContext {
        &self.inner.device_context
    }

    pub fn uid(&self) -> u32 {
        self.inner.id
    }

    /// Bindings in slot order.
    pub fn bindings(&self) -> &[DescriptorBindingDef] {
        &self.inner.bindings
    }

    pub fn binding_count(&self) -> u32 {
        self.inner.bindings.len() as u32
    }

    /// One bit per occupied slot index.
    pub fn binding_mask(&self) -> u64 {
        self.inner.binding_mask
    }

    pub fn find_binding(&self, binding: u32) -> Option<&DescriptorBindingDef> {
        self.inner
            .bindings
            .binary_search_by_key(&binding, |b| b.binding)
            .ok()
            .map(|index| &self.inner.bindings[index])
    }

    pub fn new(
        device_context: &DeviceContext,
        definition: &DescriptorSetLayoutDef,
    ) -> GfxResult<Self> {
        let definition = definition.normalized();
        assert!(definition.bindings.len() < MAX_DESCRIPTOR_BINDINGS);

        let mut binding_mask = 0u64;
        for binding in &definition.bindings {
            assert!((binding.binding as usize) < MAX_DESCRIPTOR_BINDINGS);
            binding_mask |= 1u64 << binding.binding;
        }

        let backend_layout = BackendDescriptorSetLayout::new(device_context, &definition.bindings)?;

        let descriptor_set_layout_id =
            NEXT_DESCRIPTOR_SET_LAYOUT_ID.fetch_add(1, Ordering::Relaxed);

        Ok(Self {
            inner: Arc::new(DescriptorSetLayoutInner {
                device_context: device_context.clone(),
                id: descriptor_set_layout_id,
                bindings: definition.bindings,
                binding_mask,
                backend_layout,
            }),
        })
    }

    /// Total number of buffer-class elements across the layout, used by the
    /// backends to size their batched write buffers.
    pub(crate) fn buffer_info_count(&self) -> u32 {
        self.inner
            .bindings
            .iter()
            .filter(|b| {
                matches!(
                    b.shader_resource_type,
                    ShaderResourceType::UniformBuffer | ShaderResourceType::StorageBuffer
                )
            })
            .map(DescriptorBindingDef::element_count_normalized)
            .sum()
    }

    /// Total number of image-class elements across the layout.
    pub(crate) fn image_info_count(&self) -> u32 {
        self.inner
            .bindings
            .iter()
            .filter(|b| {
                !matches!(
                    b.shader_resource_type,
                    ShaderResourceType::UniformBuffer | ShaderResourceType::StorageBuffer
                )
            })
            .map(DescriptorBindingDef::element_count_normalized)
            .sum()
    }
}

impl PartialEq for DescriptorSetLayout {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_sorts_by_slot_and_normalizes_counts() {
        let def = DescriptorSetLayoutDef::new(vec![
            DescriptorBindingDef {
                binding: 3,
                shader_resource_type: ShaderResourceType::SampledImage,
                element_count: 0,
                used_in_shader_stages: ShaderStageFlags::FRAGMENT,
            },
            DescriptorBindingDef::new(
                0,
                ShaderResourceType::UniformBuffer,
                ShaderStageFlags::ALL,
            ),
        ]);

        let normalized = def.normalized();
        assert_eq!(normalized.bindings[0].binding, 0);
        assert_eq!(normalized.bindings[1].binding, 3);
        assert_eq!(normalized.bindings[1].element_count, 1);
    }
}
