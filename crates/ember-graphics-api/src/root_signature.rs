use std::sync::Arc;

use crate::{
    backends::BackendRootSignature, DescriptorBindingDef, DescriptorSetLayout,
    DescriptorSetLayoutCache, DeviceContext, GfxResult, PipelineReflection, PushConstantRange,
    MAX_DESCRIPTOR_SET_LAYOUTS,
};

/// The program-wide binding interface: descriptor-set layouts in set-index
/// order plus the program's push-constant ranges.
#[derive(Clone, Default)]
pub struct RootSignatureDef {
    pub descriptor_set_layouts: Vec<DescriptorSetLayout>,
    pub push_constant_ranges: Vec<PushConstantRange>,
}

pub(crate) struct RootSignatureInner {
    device_context: DeviceContext,
    definition: RootSignatureDef,
    pub(crate) backend_root_signature: BackendRootSignature,
}

impl Drop for RootSignatureInner {
    fn drop(&mut self) {
        self.backend_root_signature.destroy(&self.device_context);
    }
}

#[derive(Clone)]
pub struct RootSignature {
    pub(crate) inner: Arc<RootSignatureInner>,
}

impl RootSignature {
    pub fn new(device_context: &DeviceContext, definition: RootSignatureDef) -> GfxResult<Self> {
        assert!(definition.descriptor_set_layouts.len() <= MAX_DESCRIPTOR_SET_LAYOUTS);

        let backend_root_signature = BackendRootSignature::new(device_context, &definition)?;

        Ok(Self {
            inner: Arc::new(RootSignatureInner {
                device_context: device_context.clone(),
                definition,
                backend_root_signature,
            }),
        })
    }

    /// Assembles the program layout for a reflected program: one layout per
    /// binding-set index in use (materialized through the cache so identical
    /// shapes are shared, and gap indices share the empty layout) plus the
    /// per-stage-class push-constant ranges.
    pub fn from_reflection(
        device_context: &DeviceContext,
        reflection: &PipelineReflection,
        layout_cache: &mut DescriptorSetLayoutCache,
    ) -> GfxResult<Self> {
        let device_info = device_context.device_info();
        for resource in &reflection.shader_resources {
            resource.validate(device_info)?;
        }

        let set_count = reflection
            .shader_resources
            .iter()
            .map(|resource| resource.set_index + 1)
            .max()
            .unwrap_or(0) as usize;

        let mut per_set_bindings: Vec<Vec<DescriptorBindingDef>> = vec![Vec::new(); set_count];
        for resource in &reflection.shader_resources {
            per_set_bindings[resource.set_index as usize].push(resource.binding_def()?);
        }

        let mut descriptor_set_layouts = Vec::with_capacity(set_count);
        for bindings in &per_set_bindings {
            descriptor_set_layouts.push(layout_cache.get_or_create(bindings)?);
        }

        Self::new(
            device_context,
            RootSignatureDef {
                descriptor_set_layouts,
                push_constant_ranges: reflection.push_constant_ranges(),
            },
        )
    }

    pub fn device_context(&self) -> &DeviceContext {
        &self.inner.device_context
    }

    pub fn definition(&self) -> &RootSignatureDef {
        &self.inner.definition
    }
}

#[cfg(all(test, not(feature = "vulkan")))]
mod tests {
    use super::*;
    use crate::{
        ApiDef, GfxApi, ShaderResource, ShaderResourceType, ShaderStageFlags,
    };

    fn resource(set_index: u32, binding: u32, stages: ShaderStageFlags) -> ShaderResource {
        ShaderResource {
            name: format!("resource_{}_{}", set_index, binding),
            shader_resource_type: Some(ShaderResourceType::UniformBuffer),
            set_index,
            binding,
            element_count: 1,
            used_in_shader_stages: stages,
        }
    }

    #[test]
    fn gap_set_indices_share_the_empty_layout() {
        let api = unsafe { GfxApi::new(&ApiDef::default()).unwrap() };
        let device_context = api.device_context();
        let mut cache = DescriptorSetLayoutCache::new(device_context);

        let reflection = PipelineReflection {
            shader_stages: ShaderStageFlags::VERTEX,
            shader_resources: vec![
                resource(0, 0, ShaderStageFlags::VERTEX),
                resource(2, 0, ShaderStageFlags::VERTEX),
            ],
            push_constant_blocks: vec![],
        };

        let root_signature =
            RootSignature::from_reflection(device_context, &reflection, &mut cache).unwrap();
        let layouts = &root_signature.definition().descriptor_set_layouts;
        assert_eq!(layouts.len(), 3);
        assert_eq!(layouts[1].binding_count(), 0);

        // Sets 0 and 2 have the same shape and dedup to one layout; the gap
        // set adds the empty layout.
        assert_eq!(layouts[0].uid(), layouts[2].uid());
        assert_eq!(cache.layout_count(), 2);

        drop(root_signature);
        cache.destroy();
    }

    #[test]
    fn set_index_beyond_device_limit_is_fatal() {
        let api = unsafe { GfxApi::new(&ApiDef::default()).unwrap() };
        let device_context = api.device_context();
        let mut cache = DescriptorSetLayoutCache::new(device_context);

        let limit = device_context.device_info().max_bound_descriptor_sets;
        let reflection = PipelineReflection {
            shader_stages: ShaderStageFlags::VERTEX,
            shader_resources: vec![resource(limit, 0, ShaderStageFlags::VERTEX)],
            push_constant_blocks: vec![],
        };

        assert!(
            RootSignature::from_reflection(device_context, &reflection, &mut cache).is_err()
        );

        cache.destroy();
    }

    #[test]
    fn unsupported_resource_kind_is_fatal() {
        let api = unsafe { GfxApi::new(&ApiDef::default()).unwrap() };
        let device_context = api.device_context();
        let mut cache = DescriptorSetLayoutCache::new(device_context);

        let mut unknown = resource(0, 0, ShaderStageFlags::VERTEX);
        unknown.shader_resource_type = None;

        let reflection = PipelineReflection {
            shader_stages: ShaderStageFlags::VERTEX,
            shader_resources: vec![unknown],
            push_constant_blocks: vec![],
        };

        assert!(
            RootSignature::from_reflection(device_context, &reflection, &mut cache).is_err()
        );

        cache.destroy();
    }
}
