use crate::{
    BufferView, DescriptorBindingDef, DescriptorPoolAllocator, DescriptorRef, DescriptorSet,
    DescriptorSetLayoutCache, DescriptorSetWriter, GfxResult, Sampler, ShaderResourceType,
    ShaderStageFlags, TextureView,
};

/// Short-lived helper that accumulates binding declarations plus the concrete
/// resources for one descriptor set, then resolves the layout through the
/// cache, carves a set from the pool allocator and writes all references in
/// one batched update. Bind order does not need to match slot order.
pub struct DescriptorSetBuilder<'builder, 'refs> {
    layout_cache: &'builder mut DescriptorSetLayoutCache,
    pool_allocator: &'builder mut DescriptorPoolAllocator,
    bindings: Vec<DescriptorBindingDef>,
    writes: Vec<(u32, DescriptorRef<'refs>)>,
}

impl<'builder, 'refs> DescriptorSetBuilder<'builder, 'refs> {
    pub fn begin(
        layout_cache: &'builder mut DescriptorSetLayoutCache,
        pool_allocator: &'builder mut DescriptorPoolAllocator,
    ) -> Self {
        Self {
            layout_cache,
            pool_allocator,
            bindings: Vec::new(),
            writes: Vec::new(),
        }
    }

    pub fn bind_buffer(
        &mut self,
        binding: u32,
        shader_resource_type: ShaderResourceType,
        stages: ShaderStageFlags,
        buffer_view: &'refs BufferView,
    ) -> &mut Self {
        self.bindings.push(DescriptorBindingDef::new(
            binding,
            shader_resource_type,
            stages,
        ));
        self.writes.push((binding, DescriptorRef::BufferView(buffer_view)));
        self
    }

    pub fn bind_texture(
        &mut self,
        binding: u32,
        shader_resource_type: ShaderResourceType,
        stages: ShaderStageFlags,
        texture_view: &'refs TextureView,
    ) -> &mut Self {
        self.bindings.push(DescriptorBindingDef::new(
            binding,
            shader_resource_type,
            stages,
        ));
        self.writes
            .push((binding, DescriptorRef::TextureView(texture_view)));
        self
    }

    pub fn bind_combined_image_sampler(
        &mut self,
        binding: u32,
        stages: ShaderStageFlags,
        texture_view: &'refs TextureView,
        sampler: &'refs Sampler,
    ) -> &mut Self {
        self.bindings.push(DescriptorBindingDef::new(
            binding,
            ShaderResourceType::CombinedImageSampler,
            stages,
        ));
        self.writes.push((
            binding,
            DescriptorRef::CombinedImageSampler(texture_view, sampler),
        ));
        self
    }

    pub fn bind_sampler(
        &mut self,
        binding: u32,
        stages: ShaderStageFlags,
        sampler: &'refs Sampler,
    ) -> &mut Self {
        self.bindings.push(DescriptorBindingDef::new(
            binding,
            ShaderResourceType::Sampler,
            stages,
        ));
        self.writes.push((binding, DescriptorRef::Sampler(sampler)));
        self
    }

    /// Resolves the layout, allocates the set (the allocator's single retry
    /// applies) and writes every accumulated reference. Either a fully
    /// written set is returned or the error leaves no observable set behind.
    pub fn build(self) -> GfxResult<DescriptorSet> {
        let layout = self.layout_cache.get_or_create(&self.bindings)?;
        let descriptor_set = self.pool_allocator.allocate(&layout)?;

        let mut writer = DescriptorSetWriter::new(descriptor_set.handle(), &layout)?;
        for (binding, descriptor_ref) in &self.writes {
            writer.set_descriptors_by_binding(*binding, std::slice::from_ref(descriptor_ref))?;
        }
        writer.flush(layout.device_context())?;

        Ok(descriptor_set)
    }
}

#[cfg(all(test, not(feature = "vulkan")))]
mod tests {
    use super::*;
    use crate::{ApiDef, DescriptorPoolDef, GfxApi};

    #[test]
    fn bind_order_resolves_to_the_same_layout() {
        let api = unsafe { GfxApi::new(&ApiDef::default()).unwrap() };
        let device_context = api.device_context();

        let mut cache = DescriptorSetLayoutCache::new(device_context);
        let mut allocator =
            DescriptorPoolAllocator::new(device_context, DescriptorPoolDef::default());

        let buffer = BufferView::from_raw(Default::default(), 0, 256);
        let texture = TextureView::from_raw(Default::default());
        let sampler = Sampler::from_raw(Default::default());

        // Image first, buffer second.
        let mut builder = DescriptorSetBuilder::begin(&mut cache, &mut allocator);
        builder
            .bind_combined_image_sampler(1, ShaderStageFlags::FRAGMENT, &texture, &sampler)
            .bind_buffer(
                0,
                ShaderResourceType::UniformBuffer,
                ShaderStageFlags::ALL,
                &buffer,
            );
        let first = builder.build().unwrap();

        // Buffer first, image second.
        let mut builder = DescriptorSetBuilder::begin(&mut cache, &mut allocator);
        builder
            .bind_buffer(
                0,
                ShaderResourceType::UniformBuffer,
                ShaderStageFlags::ALL,
                &buffer,
            )
            .bind_combined_image_sampler(1, ShaderStageFlags::FRAGMENT, &texture, &sampler);
        let second = builder.build().unwrap();

        assert_eq!(first.layout().uid(), second.layout().uid());
        assert_eq!(cache.layout_count(), 1);
        assert_ne!(first.handle(), second.handle());

        drop((first, second));
        allocator.destroy();
        cache.destroy();
    }

    #[test]
    fn mismatched_reference_kind_fails_cleanly() {
        let api = unsafe { GfxApi::new(&ApiDef::default()).unwrap() };
        let device_context = api.device_context();

        let mut cache = DescriptorSetLayoutCache::new(device_context);
        let mut allocator =
            DescriptorPoolAllocator::new(device_context, DescriptorPoolDef::default());

        let buffer = BufferView::from_raw(Default::default(), 0, 64);

        // Declared as a sampled image but fed a buffer reference.
        let mut builder = DescriptorSetBuilder::begin(&mut cache, &mut allocator);
        builder.bind_buffer(
            0,
            ShaderResourceType::SampledImage,
            ShaderStageFlags::FRAGMENT,
            &buffer,
        );
        assert!(builder.build().is_err());

        allocator.destroy();
        cache.destroy();
    }
}
