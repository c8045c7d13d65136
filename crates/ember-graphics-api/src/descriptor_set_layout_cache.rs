use fnv::FnvHashMap;
use log::trace;

use crate::{
    DescriptorBindingDef, DescriptorSetLayout, DescriptorSetLayoutDef, DeviceContext, GfxResult,
};

/// Structural deduplication of descriptor-set layouts: any two binding lists
/// that are equal after slot-sorting share one created layout for the
/// lifetime of the cache. The cache owns every layout it has produced;
/// consumers hold clones of the shared handle.
pub struct DescriptorSetLayoutCache {
    device_context: DeviceContext,
    layouts: FnvHashMap<DescriptorSetLayoutDef, DescriptorSetLayout>,
}

impl DescriptorSetLayoutCache {
    pub fn new(device_context: &DeviceContext) -> Self {
        Self {
            device_context: device_context.clone(),
            layouts: FnvHashMap::default(),
        }
    }

    /// Returns the layout for the given bindings, creating it on first use.
    /// Declaration order is irrelevant; repeating a slot index is a caller
    /// contract violation.
    pub fn get_or_create(
        &mut self,
        bindings: &[DescriptorBindingDef],
    ) -> GfxResult<DescriptorSetLayout> {
        let key = DescriptorSetLayoutDef::new(bindings.to_vec()).normalized();

        if let Some(existing) = self.layouts.get(&key) {
            return Ok(existing.clone());
        }

        trace!("layout cache miss, creating layout for {:?}", key.bindings);
        let layout = self.device_context.create_descriptor_set_layout(&key)?;
        self.layouts.insert(key, layout.clone());
        Ok(layout)
    }

    pub fn layout_count(&self) -> usize {
        self.layouts.len()
    }

    /// Drops every cached layout. Callers must ensure no descriptor set or
    /// root signature built from these layouts is still referenced by
    /// in-flight work.
    pub fn destroy(mut self) {
        self.layouts.clear();
    }
}

#[cfg(all(test, not(feature = "vulkan")))]
mod tests {
    use super::*;
    use crate::{ApiDef, GfxApi, ShaderResourceType, ShaderStageFlags};

    fn uniform_buffer(binding: u32) -> DescriptorBindingDef {
        DescriptorBindingDef::new(
            binding,
            ShaderResourceType::UniformBuffer,
            ShaderStageFlags::ALL,
        )
    }

    fn sampled_image(binding: u32) -> DescriptorBindingDef {
        DescriptorBindingDef::new(
            binding,
            ShaderResourceType::SampledImage,
            ShaderStageFlags::FRAGMENT,
        )
    }

    #[test]
    fn declaration_order_does_not_matter() {
        let api = unsafe { GfxApi::new(&ApiDef::default()).unwrap() };
        let mut cache = DescriptorSetLayoutCache::new(api.device_context());

        let first = cache
            .get_or_create(&[sampled_image(1), uniform_buffer(0)])
            .unwrap();
        let second = cache
            .get_or_create(&[uniform_buffer(0), sampled_image(1)])
            .unwrap();

        assert_eq!(first.uid(), second.uid());
        assert_eq!(cache.layout_count(), 1);

        drop((first, second));
        cache.destroy();
    }

    #[test]
    fn distinct_definitions_get_distinct_layouts() {
        let api = unsafe { GfxApi::new(&ApiDef::default()).unwrap() };
        let mut cache = DescriptorSetLayoutCache::new(api.device_context());

        let base = cache.get_or_create(&[uniform_buffer(0)]).unwrap();

        // Different slot index.
        let other_slot = cache.get_or_create(&[uniform_buffer(1)]).unwrap();
        assert_ne!(base.uid(), other_slot.uid());

        // Different resource kind at the same slot.
        let other_kind = cache.get_or_create(&[sampled_image(0)]).unwrap();
        assert_ne!(base.uid(), other_kind.uid());

        // Different stage visibility.
        let mut fragment_only = uniform_buffer(0);
        fragment_only.used_in_shader_stages = ShaderStageFlags::FRAGMENT;
        let other_stages = cache.get_or_create(&[fragment_only]).unwrap();
        assert_ne!(base.uid(), other_stages.uid());

        // Different element count.
        let mut array = uniform_buffer(0);
        array.element_count = 4;
        let other_count = cache.get_or_create(&[array]).unwrap();
        assert_ne!(base.uid(), other_count.uid());

        assert_eq!(cache.layout_count(), 5);

        drop((base, other_slot, other_kind, other_stages, other_count));
        cache.destroy();
    }

    #[test]
    fn zero_element_count_aliases_one() {
        let api = unsafe { GfxApi::new(&ApiDef::default()).unwrap() };
        let mut cache = DescriptorSetLayoutCache::new(api.device_context());

        let mut implicit = uniform_buffer(0);
        implicit.element_count = 0;
        let explicit = uniform_buffer(0);

        let a = cache.get_or_create(&[implicit]).unwrap();
        let b = cache.get_or_create(&[explicit]).unwrap();
        assert_eq!(a.uid(), b.uid());

        drop((a, b));
        cache.destroy();
    }
}
