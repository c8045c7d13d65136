use std::sync::Arc;

use crate::{
    DeviceContext, GfxResult, PipelineReflection, ShaderModule, ShaderStageFlags,
    ShaderStageReflection,
};

/// One compiled stage of a shader program: the module plus the reflection
/// metadata the shader-compilation collaborator extracted from it.
#[derive(Clone)]
pub struct ShaderStageDef {
    pub shader_module: ShaderModule,
    pub reflection: ShaderStageReflection,
}

pub(crate) struct ShaderInner {
    stage_flags: ShaderStageFlags,
    stages: Vec<ShaderStageDef>,
    pipeline_reflection: PipelineReflection,
}

/// A whole shader program: its stages and the merged reflection used to
/// derive the program's root signature.
#[derive(Clone)]
pub struct Shader {
    inner: Arc<ShaderInner>,
}

impl Shader {
    pub(crate) fn new(
        _device_context: &DeviceContext,
        stages: Vec<ShaderStageDef>,
    ) -> GfxResult<Self> {
        let pipeline_reflection = PipelineReflection::from_stages(&stages)?;

        let mut stage_flags = ShaderStageFlags::empty();
        for stage in &stages {
            stage_flags |= stage.reflection.shader_stage;
        }

        Ok(Self {
            inner: Arc::new(ShaderInner {
                stage_flags,
                stages,
                pipeline_reflection,
            }),
        })
    }

    pub fn stages(&self) -> &[ShaderStageDef] {
        &self.inner.stages
    }

    pub fn stage_flags(&self) -> ShaderStageFlags {
        self.inner.stage_flags
    }

    pub fn pipeline_reflection(&self) -> &PipelineReflection {
        &self.inner.pipeline_reflection
    }
}
