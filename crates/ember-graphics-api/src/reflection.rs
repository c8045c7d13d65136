use fnv::FnvHashMap;
use log::{error, trace};

use crate::{
    DescriptorBindingDef, DeviceInfo, GfxResult, ShaderResourceType, ShaderStageDef,
    ShaderStageFlags, FRAGMENT_PUSH_CONSTANT_OFFSET, MAX_DESCRIPTOR_SET_LAYOUTS,
    VERTEX_PUSH_CONSTANT_OFFSET,
};

/// Indicates where a resource is bound
#[derive(PartialEq, Eq, Hash, Default)]
pub struct ShaderResourceBindingKey {
    pub set: u32,
    pub binding: u32,
}

/// A shader-visible resource reported by reflecting one compiled stage.
///
/// May be specified by hand or produced by the shader-compilation
/// collaborator's reflection pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct ShaderResource {
    pub name: String,
    pub shader_resource_type: Option<ShaderResourceType>,
    pub set_index: u32,
    pub binding: u32,
    pub element_count: u32,
    pub used_in_shader_stages: ShaderStageFlags,
}

impl ShaderResource {
    pub fn element_count_normalized(&self) -> u32 {
        // Assume 0 = default of 1
        self.element_count.max(1)
    }

    pub fn validate(&self, device_info: &DeviceInfo) -> GfxResult<()> {
        let max_sets =
            (MAX_DESCRIPTOR_SET_LAYOUTS as u32).min(device_info.max_bound_descriptor_sets);
        if self.set_index >= max_sets {
            return Err(format!(
                "Descriptor (set={:?} binding={:?}) named {:?} has a set index >= {}. This is not supported",
                self.set_index, self.binding, self.name, max_sets,
            )
            .into());
        }

        Ok(())
    }

    fn binding_key(&self) -> ShaderResourceBindingKey {
        ShaderResourceBindingKey {
            set: self.set_index,
            binding: self.binding,
        }
    }

    /// The resource kind, or an error for metadata this subsystem cannot
    /// bind correctly.
    pub(crate) fn shader_resource_type_checked(&self) -> GfxResult<ShaderResourceType> {
        self.shader_resource_type.ok_or_else(|| {
            format!(
                "Resource {:?} (set={} binding={}) has an unsupported resource kind",
                self.name, self.set_index, self.binding
            )
            .into()
        })
    }

    pub(crate) fn binding_def(&self) -> GfxResult<DescriptorBindingDef> {
        Ok(DescriptorBindingDef {
            binding: self.binding,
            shader_resource_type: self.shader_resource_type_checked()?,
            element_count: self.element_count_normalized(),
            used_in_shader_stages: self.used_in_shader_stages,
        })
    }

    fn verify_compatible_across_stages(&self, other: &Self) -> GfxResult<()> {
        if self.shader_resource_type != other.shader_resource_type {
            return Err(format!(
                "Program is using shaders in different stages with different resource types {:?} and {:?} (set={} binding={})",
                self.shader_resource_type, other.shader_resource_type,
                self.set_index,
                self.binding
            ).into());
        }

        if self.element_count_normalized() != other.element_count_normalized() {
            return Err(format!(
                "Program is using shaders in different stages with different element counts {} and {} (set={} binding={})",
                self.element_count_normalized(), other.element_count_normalized(),
                self.set_index, self.binding
            ).into());
        }

        Ok(())
    }
}

/// One push-constant block of one stage, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct PushConstantBlock {
    pub name: String,
    pub size: u32,
    pub used_in_shader_stages: ShaderStageFlags,
}

/// A push-constant byte range of the assembled program layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PushConstantRange {
    pub stage_flags: ShaderStageFlags,
    pub offset: u32,
    pub size: u32,
}

/// Reflection data for a single shader stage
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct ShaderStageReflection {
    pub shader_stage: ShaderStageFlags,
    pub shader_resources: Vec<ShaderResource>,
    pub push_constants: Vec<PushConstantBlock>,
    pub entry_point_name: String,
}

/// Reflection data for a whole program, created by merging the per-stage
/// reflections across all of its stages.
#[derive(Debug, Clone)]
pub struct PipelineReflection {
    pub shader_stages: ShaderStageFlags,
    pub shader_resources: Vec<ShaderResource>,
    pub push_constant_blocks: Vec<PushConstantBlock>,
}

impl PipelineReflection {
    pub fn from_stages(stages: &[ShaderStageDef]) -> GfxResult<Self> {
        let mut all_shader_stages = ShaderStageFlags::empty();
        for stage in stages {
            if all_shader_stages.intersects(stage.reflection.shader_stage) {
                return Err(format!(
                    "Duplicate shader stage ({}) found when creating PipelineReflection",
                    (all_shader_stages & stage.reflection.shader_stage).bits()
                )
                .into());
            }

            all_shader_stages |= stage.reflection.shader_stage;
        }

        let mut unmerged_resources = Vec::default();
        for stage in stages {
            assert!(!stage.reflection.shader_stage.is_empty());
            for resource in &stage.reflection.shader_resources {
                // The provided resource MAY (but does not need to) have the
                // shader stage flag set. (Leaving it default empty is fine.)
                // It will automatically be set here.
                if !(resource.used_in_shader_stages - stage.reflection.shader_stage).is_empty() {
                    let message = format!(
                        "A resource in shader stage {:?} has other stages {:?} set",
                        stage.reflection.shader_stage,
                        resource.used_in_shader_stages - stage.reflection.shader_stage
                    );
                    error!("{}", message);
                    return Err(message.into());
                }

                let mut resource = resource.clone();
                resource.used_in_shader_stages |= stage.reflection.shader_stage;
                unmerged_resources.push(resource);
            }
        }

        trace!("Create PipelineReflection from stages");
        let mut merged_resources =
            FnvHashMap::<ShaderResourceBindingKey, ShaderResource>::default();
        for resource in &unmerged_resources {
            trace!(
                "    Resource {:?} from stage {:?}",
                resource.name,
                resource.used_in_shader_stages
            );
            let key = resource.binding_key();
            if let Some(existing_resource) = merged_resources.get_mut(&key) {
                existing_resource.verify_compatible_across_stages(resource)?;

                trace!(
                    "      Already used in stages {:?} and is compatible, adding stage {:?}",
                    existing_resource.used_in_shader_stages,
                    resource.used_in_shader_stages,
                );
                existing_resource.used_in_shader_stages |= resource.used_in_shader_stages;
            } else {
                trace!(
                    "      Resource not yet used, adding it for stage {:?}",
                    resource.used_in_shader_stages
                );
                assert!(!resource.used_in_shader_stages.is_empty());
                let old = merged_resources.insert(key, resource.clone());
                assert!(old.is_none());
            }
        }

        // Push-constant blocks are not merged: each stage class gets its own
        // independently laid out ranges, so blocks keep their declaring
        // stage and their declaration order.
        let mut push_constant_blocks = Vec::default();
        for stage in stages {
            for push_constant in &stage.reflection.push_constants {
                if !(push_constant.used_in_shader_stages - stage.reflection.shader_stage)
                    .is_empty()
                {
                    let message = format!(
                        "A push constant in shader stage {:?} has other stages {:?} set",
                        stage.reflection.shader_stage,
                        push_constant.used_in_shader_stages - stage.reflection.shader_stage
                    );
                    error!("{}", message);
                    return Err(message.into());
                }

                let mut push_constant = push_constant.clone();
                push_constant.used_in_shader_stages |= stage.reflection.shader_stage;
                push_constant_blocks.push(push_constant);
            }
        }

        let mut shader_resources: Vec<_> = merged_resources.into_iter().map(|(_, v)| v).collect();
        shader_resources.sort_by_key(|r| (r.set_index, r.binding));

        Ok(Self {
            shader_stages: all_shader_stages,
            shader_resources,
            push_constant_blocks,
        })
    }

    /// Lays out the program's push-constant ranges. Each stage class grows
    /// independently from its fixed base offset: the first block of a class
    /// sits at the base, every following block at the previous block's
    /// offset plus size. Ranges of different classes never overlap because
    /// the vertex window ends where the fragment base begins.
    pub fn push_constant_ranges(&self) -> Vec<PushConstantRange> {
        let mut ranges = Vec::new();

        for (stage, base_offset) in [
            (ShaderStageFlags::VERTEX, VERTEX_PUSH_CONSTANT_OFFSET),
            (ShaderStageFlags::FRAGMENT, FRAGMENT_PUSH_CONSTANT_OFFSET),
            (ShaderStageFlags::COMPUTE, 0),
        ] {
            let mut offset = base_offset;
            for block in self
                .push_constant_blocks
                .iter()
                .filter(|block| block.used_in_shader_stages.intersects(stage))
            {
                ranges.push(PushConstantRange {
                    stage_flags: stage,
                    offset,
                    size: block.size,
                });
                offset += block.size;
            }
        }

        ranges
    }
}

#[cfg(all(test, not(feature = "vulkan")))]
mod tests {
    use super::*;
    use crate::{ApiDef, GfxApi, ShaderModuleDef};

    fn stage_def(
        device_context: &crate::DeviceContext,
        reflection: ShaderStageReflection,
    ) -> ShaderStageDef {
        ShaderStageDef {
            shader_module: device_context
                .create_shader_module(ShaderModuleDef::Null(std::marker::PhantomData))
                .unwrap(),
            reflection,
        }
    }

    fn uniform_resource(name: &str, set_index: u32, binding: u32) -> ShaderResource {
        ShaderResource {
            name: name.to_string(),
            shader_resource_type: Some(ShaderResourceType::UniformBuffer),
            set_index,
            binding,
            element_count: 1,
            used_in_shader_stages: ShaderStageFlags::empty(),
        }
    }

    #[test]
    fn resources_shared_across_stages_merge_into_one() {
        let api = unsafe { GfxApi::new(&ApiDef::default()).unwrap() };
        let device_context = api.device_context();

        let vertex = stage_def(
            device_context,
            ShaderStageReflection {
                shader_stage: ShaderStageFlags::VERTEX,
                shader_resources: vec![uniform_resource("scene", 0, 0)],
                push_constants: vec![],
                entry_point_name: "main".to_string(),
            },
        );
        let fragment = stage_def(
            device_context,
            ShaderStageReflection {
                shader_stage: ShaderStageFlags::FRAGMENT,
                shader_resources: vec![uniform_resource("scene", 0, 0)],
                push_constants: vec![],
                entry_point_name: "main".to_string(),
            },
        );

        let reflection = PipelineReflection::from_stages(&[vertex, fragment]).unwrap();
        assert_eq!(reflection.shader_resources.len(), 1);
        assert_eq!(
            reflection.shader_resources[0].used_in_shader_stages,
            ShaderStageFlags::VERTEX | ShaderStageFlags::FRAGMENT
        );
    }

    #[test]
    fn incompatible_types_at_one_slot_are_rejected() {
        let api = unsafe { GfxApi::new(&ApiDef::default()).unwrap() };
        let device_context = api.device_context();

        let mut image = uniform_resource("scene", 0, 0);
        image.shader_resource_type = Some(ShaderResourceType::SampledImage);

        let vertex = stage_def(
            device_context,
            ShaderStageReflection {
                shader_stage: ShaderStageFlags::VERTEX,
                shader_resources: vec![uniform_resource("scene", 0, 0)],
                push_constants: vec![],
                entry_point_name: "main".to_string(),
            },
        );
        let fragment = stage_def(
            device_context,
            ShaderStageReflection {
                shader_stage: ShaderStageFlags::FRAGMENT,
                shader_resources: vec![image],
                push_constants: vec![],
                entry_point_name: "main".to_string(),
            },
        );

        assert!(PipelineReflection::from_stages(&[vertex, fragment]).is_err());
    }

    #[test]
    fn duplicate_stages_are_rejected() {
        let api = unsafe { GfxApi::new(&ApiDef::default()).unwrap() };
        let device_context = api.device_context();

        let reflection = ShaderStageReflection {
            shader_stage: ShaderStageFlags::VERTEX,
            shader_resources: vec![],
            push_constants: vec![],
            entry_point_name: "main".to_string(),
        };
        let a = stage_def(device_context, reflection.clone());
        let b = stage_def(device_context, reflection);

        assert!(PipelineReflection::from_stages(&[a, b]).is_err());
    }

    #[test]
    fn push_constant_ranges_grow_monotonically_per_stage_class() {
        let api = unsafe { GfxApi::new(&ApiDef::default()).unwrap() };
        let device_context = api.device_context();

        let vertex = stage_def(
            device_context,
            ShaderStageReflection {
                shader_stage: ShaderStageFlags::VERTEX,
                shader_resources: vec![],
                push_constants: vec![
                    PushConstantBlock {
                        name: "transform".to_string(),
                        size: 64,
                        used_in_shader_stages: ShaderStageFlags::empty(),
                    },
                    PushConstantBlock {
                        name: "skinning".to_string(),
                        size: 16,
                        used_in_shader_stages: ShaderStageFlags::empty(),
                    },
                ],
                entry_point_name: "main".to_string(),
            },
        );
        let fragment = stage_def(
            device_context,
            ShaderStageReflection {
                shader_stage: ShaderStageFlags::FRAGMENT,
                shader_resources: vec![],
                push_constants: vec![PushConstantBlock {
                    name: "material".to_string(),
                    size: 32,
                    used_in_shader_stages: ShaderStageFlags::empty(),
                }],
                entry_point_name: "main".to_string(),
            },
        );

        let reflection = PipelineReflection::from_stages(&[vertex, fragment]).unwrap();
        let ranges = reflection.push_constant_ranges();

        let vertex_ranges: Vec<_> = ranges
            .iter()
            .filter(|r| r.stage_flags == ShaderStageFlags::VERTEX)
            .collect();
        assert_eq!(vertex_ranges.len(), 2);
        assert_eq!(vertex_ranges[0].offset, VERTEX_PUSH_CONSTANT_OFFSET);
        assert_eq!(
            vertex_ranges[1].offset,
            vertex_ranges[0].offset + vertex_ranges[0].size
        );

        let fragment_ranges: Vec<_> = ranges
            .iter()
            .filter(|r| r.stage_flags == ShaderStageFlags::FRAGMENT)
            .collect();
        assert_eq!(fragment_ranges.len(), 1);
        assert_eq!(fragment_ranges[0].offset, FRAGMENT_PUSH_CONSTANT_OFFSET);
        assert_eq!(fragment_ranges[0].size, 32);
    }

    #[test]
    fn fragment_blocks_larger_than_the_base_offset_keep_their_size() {
        let api = unsafe { GfxApi::new(&ApiDef::default()).unwrap() };
        let device_context = api.device_context();

        let fragment = stage_def(
            device_context,
            ShaderStageReflection {
                shader_stage: ShaderStageFlags::FRAGMENT,
                shader_resources: vec![],
                push_constants: vec![PushConstantBlock {
                    name: "lighting".to_string(),
                    size: FRAGMENT_PUSH_CONSTANT_OFFSET + 64,
                    used_in_shader_stages: ShaderStageFlags::empty(),
                }],
                entry_point_name: "main".to_string(),
            },
        );

        let reflection = PipelineReflection::from_stages(&[fragment]).unwrap();
        let ranges = reflection.push_constant_ranges();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].size, FRAGMENT_PUSH_CONSTANT_OFFSET + 64);
    }
}
