use crate::{ApiDef, DeviceContext, DeviceInfo, GfxResult};

/// The externally created vulkan device this crate binds against. Device and
/// queue setup belong to the embedding renderer (instance creation, physical
/// device selection, feature negotiation); only the logical device handle and
/// the limits this subsystem consults cross the boundary.
#[derive(Clone)]
pub struct VulkanExternalDevice {
    pub device: ash::Device,
    pub device_info: DeviceInfo,
}

pub(crate) struct VulkanDeviceContext {
    vk_device: ash::Device,
}

impl std::fmt::Debug for VulkanDeviceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VulkanDeviceContext")
            .field("handle", &self.vk_device.handle())
            .finish()
    }
}

impl VulkanDeviceContext {
    pub(crate) fn new(api_def: &ApiDef) -> GfxResult<(Self, DeviceInfo)> {
        let external_device = api_def
            .vulkan_device
            .as_ref()
            .ok_or("the vulkan backend requires an externally created device")?;

        Ok((
            Self {
                vk_device: external_device.device.clone(),
            },
            external_device.device_info,
        ))
    }

    pub(crate) fn destroy(&self) {
        // The logical device is owned by the embedding renderer and outlives
        // every object this crate created from it; nothing to release here.
    }

    pub(crate) fn vk_device(&self) -> &ash::Device {
        &self.vk_device
    }
}

impl DeviceContext {
    pub(crate) fn vk_device(&self) -> &ash::Device {
        self.inner.backend_device_context.vk_device()
    }
}
