use log::error;

use crate::{
    backends::BackendDescriptorSetWriter, DescriptorRef, DescriptorSetHandle, DescriptorSetLayout,
    DeviceContext, GfxResult, MAX_DESCRIPTOR_BINDINGS,
};

/// Collects descriptor writes for one set and submits them as a single
/// batched backend update on [`flush`]. A set is only observable once every
/// slot of its layout has been written: flushing with missing slots is
/// refused, so a partially-written set can never escape to draw recording.
///
/// [`flush`]: DescriptorSetWriter::flush
pub struct DescriptorSetWriter {
    pub(crate) descriptor_set: DescriptorSetHandle,
    pub(crate) descriptor_set_layout: DescriptorSetLayout,
    pub(crate) backend_write: BackendDescriptorSetWriter,
    write_mask: u64, // max number of bindings: 64
}

impl DescriptorSetWriter {
    pub fn new(
        descriptor_set: DescriptorSetHandle,
        descriptor_set_layout: &DescriptorSetLayout,
    ) -> GfxResult<Self> {
        let backend_write = BackendDescriptorSetWriter::new(descriptor_set_layout)?;

        Ok(Self {
            descriptor_set,
            descriptor_set_layout: descriptor_set_layout.clone(),
            backend_write,
            write_mask: descriptor_set_layout.binding_mask(),
        })
    }

    /// Queues the references for one slot. `refs` must contain exactly the
    /// slot's element count, and every reference must match the slot's
    /// resource kind.
    pub fn set_descriptors_by_binding(
        &mut self,
        binding: u32,
        refs: &[DescriptorRef<'_>],
    ) -> GfxResult<()> {
        let descriptor = self
            .descriptor_set_layout
            .find_binding(binding)
            .ok_or_else(|| {
                crate::GfxError::from(format!(
                    "binding {} is not part of the descriptor set layout",
                    binding
                ))
            })?;

        if refs.len() as u32 != descriptor.element_count_normalized() {
            return Err(format!(
                "binding {} expects {} element(s), got {}",
                binding,
                descriptor.element_count_normalized(),
                refs.len()
            )
            .into());
        }

        for descriptor_ref in refs {
            if !descriptor_ref.is_compatible_with(descriptor.shader_resource_type) {
                return Err(format!(
                    "resource reference incompatible with {} at binding {}",
                    descriptor.shader_resource_type.as_str(),
                    binding
                )
                .into());
            }
        }

        self.write_mask &= !(1u64 << binding);
        self.backend_write.queue_descriptors(
            &self.descriptor_set,
            descriptor,
            refs,
        );
        Ok(())
    }

    /// Submits all queued writes in one backend update and hands the set
    /// back, or fails without touching the set if any slot was left unwritten.
    pub fn flush(self, device_context: &DeviceContext) -> GfxResult<DescriptorSetHandle> {
        if self.write_mask != 0 {
            error!("DescriptorSetWriter cannot be flushed due to missing descriptors");
            for i in 0..MAX_DESCRIPTOR_BINDINGS {
                let mask = 1u64 << i;
                if (self.write_mask & mask) != 0 {
                    error!("{:?}", self.descriptor_set_layout.find_binding(i as u32));
                }
            }
            return Err("descriptor set flushed with unwritten bindings".into());
        }

        self.backend_write.flush(device_context);
        Ok(self.descriptor_set)
    }
}
