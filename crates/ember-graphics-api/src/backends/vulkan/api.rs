use crate::{ApiDef, DeviceContext, GfxResult};

#[derive(Debug)]
pub(crate) struct VulkanApi;

impl VulkanApi {
    /// # Safety
    /// The device handles in `api_def` must remain valid for the lifetime of
    /// every object created through the returned context.
    #[allow(unsafe_code)]
    pub unsafe fn new(api_def: &ApiDef) -> GfxResult<(Self, DeviceContext)> {
        let device_context = DeviceContext::new(api_def)?;
        Ok((Self, device_context))
    }
}
