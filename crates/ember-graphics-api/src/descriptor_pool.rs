use std::sync::Arc;

use log::trace;

use crate::{
    backends::{BackendDescriptorPool, BackendDescriptorSetHandle},
    DescriptorSetLayout, DeviceContext, GfxError, GfxResult,
};

/// Default set budget of one pool. Per-kind descriptor capacities are derived
/// from this via a fixed ratio table, see [`DescriptorPoolDef::from_set_budget`].
pub const DEFAULT_DESCRIPTOR_POOL_SET_BUDGET: u32 = 1000;

/// Fixed capacities of one descriptor pool. Pools cannot be resized after
/// creation, so the allocator recycles whole pools instead.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DescriptorPoolDef {
    pub max_descriptor_sets: u32,
    pub sampler_count: u32,
    pub combined_image_sampler_count: u32,
    pub sampled_image_count: u32,
    pub storage_image_count: u32,
    pub uniform_buffer_count: u32,
    pub storage_buffer_count: u32,
}

impl DescriptorPoolDef {
    /// Sizes every descriptor kind from a set budget with a fixed ratio
    /// table: combined image samplers and sampled images at 4x, buffers at
    /// 2x, standalone samplers at 0.5x.
    pub fn from_set_budget(max_descriptor_sets: u32) -> Self {
        Self {
            max_descriptor_sets,
            sampler_count: max_descriptor_sets / 2,
            combined_image_sampler_count: max_descriptor_sets * 4,
            sampled_image_count: max_descriptor_sets * 4,
            storage_image_count: max_descriptor_sets,
            uniform_buffer_count: max_descriptor_sets * 2,
            storage_buffer_count: max_descriptor_sets * 2,
        }
    }
}

impl Default for DescriptorPoolDef {
    fn default() -> Self {
        Self::from_set_budget(DEFAULT_DESCRIPTOR_POOL_SET_BUDGET)
    }
}

/// Copyable handle to an allocated descriptor set, the value bound at draw
/// recording time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DescriptorSetHandle {
    pub(crate) backend_descriptor_set_handle: BackendDescriptorSetHandle,
}

/// An allocated descriptor set together with the layout it was carved with.
/// Reclaimed only by resetting the owning pool; there is no per-set free.
#[derive(Clone)]
pub struct DescriptorSet {
    pub(crate) layout: DescriptorSetLayout,
    pub(crate) handle: DescriptorSetHandle,
}

impl DescriptorSet {
    pub fn layout(&self) -> &DescriptorSetLayout {
        &self.layout
    }

    pub fn handle(&self) -> DescriptorSetHandle {
        self.handle
    }
}

pub(crate) struct DescriptorPoolInner {
    device_context: DeviceContext,
    definition: DescriptorPoolDef,

    pub(crate) backend_pool: BackendDescriptorPool,
}

impl Drop for DescriptorPoolInner {
    fn drop(&mut self) {
        self.backend_pool.destroy(&self.device_context);
    }
}

/// One fixed-capacity descriptor pool. Sets carved from it are invalidated
/// in bulk by [`DescriptorPool::reset`]; the pool is destroyed when the last
/// handle drops.
#[derive(Clone)]
pub struct DescriptorPool {
    pub(crate) inner: Arc<DescriptorPoolInner>,
}

impl DescriptorPool {
    pub(crate) fn new(
        device_context: &DeviceContext,
        definition: &DescriptorPoolDef,
    ) -> GfxResult<Self> {
        let backend_pool = BackendDescriptorPool::new(device_context, definition)?;

        Ok(Self {
            inner: Arc::new(DescriptorPoolInner {
                device_context: device_context.clone(),
                definition: definition.clone(),
                backend_pool,
            }),
        })
    }

    pub fn definition(&self) -> &DescriptorPoolDef {
        &self.inner.definition
    }

    /// Carves one set of the given shape out of this pool. Fails with
    /// [`GfxError::OutOfPoolMemory`] once capacity is exhausted.
    pub fn allocate_descriptor_set(
        &self,
        layout: &DescriptorSetLayout,
    ) -> GfxResult<DescriptorSet> {
        let handle = self
            .inner
            .backend_pool
            .allocate(&self.inner.device_context, layout)?;

        Ok(DescriptorSet {
            layout: layout.clone(),
            handle,
        })
    }

    /// Bulk-invalidates every set carved from this pool and restores full
    /// capacity. The caller must have fence-synchronized: no in-flight GPU
    /// work may still read these sets.
    pub fn reset(&self) -> GfxResult<()> {
        self.inner.backend_pool.reset(&self.inner.device_context)
    }
}

/// Tracks which pool allocations are currently served from.
enum CurrentPool {
    Unset,
    Active(DescriptorPool),
}

/// Owns a growing population of fixed-capacity descriptor pools and serves
/// set allocations from the most recently acquired one. Exhausted pools are
/// parked in the used list and recycled wholesale on [`reset_all`].
///
/// [`reset_all`]: DescriptorPoolAllocator::reset_all
pub struct DescriptorPoolAllocator {
    device_context: DeviceContext,
    definition: DescriptorPoolDef,
    current: CurrentPool,
    free_pools: Vec<DescriptorPool>,
    used_pools: Vec<DescriptorPool>,
}

impl DescriptorPoolAllocator {
    pub fn new(device_context: &DeviceContext, definition: DescriptorPoolDef) -> Self {
        Self {
            device_context: device_context.clone(),
            definition,
            current: CurrentPool::Unset,
            free_pools: Vec::new(),
            used_pools: Vec::new(),
        }
    }

    /// Pops the most recently freed pool, creating a new one only when none
    /// is free. Pool creation failure means API-level resource exhaustion and
    /// is fatal.
    pub fn acquire_pool(&mut self) -> GfxResult<DescriptorPool> {
        if let Some(pool) = self.free_pools.pop() {
            return Ok(pool);
        }

        trace!(
            "no free descriptor pool, creating one ({} sets)",
            self.definition.max_descriptor_sets
        );
        self.device_context.create_descriptor_pool(&self.definition)
    }

    /// Allocates one set of the given shape from the current pool, lazily
    /// acquiring one on first use. On pool exhaustion the current pool is
    /// retired and the allocation retried exactly once on a fresh pool; a
    /// second transient failure is returned to the caller.
    pub fn allocate(&mut self, layout: &DescriptorSetLayout) -> GfxResult<DescriptorSet> {
        if let CurrentPool::Unset = self.current {
            self.current = CurrentPool::Active(self.acquire_pool()?);
        }

        let pool = match &self.current {
            CurrentPool::Active(pool) => pool,
            CurrentPool::Unset => unreachable!(),
        };

        match pool.allocate_descriptor_set(layout) {
            Err(GfxError::OutOfPoolMemory) => {
                let fresh = self.acquire_pool()?;
                let exhausted = std::mem::replace(&mut self.current, CurrentPool::Active(fresh));
                if let CurrentPool::Active(pool) = exhausted {
                    self.used_pools.push(pool);
                }

                let pool = match &self.current {
                    CurrentPool::Active(pool) => pool,
                    CurrentPool::Unset => unreachable!(),
                };
                pool.allocate_descriptor_set(layout)
            }
            other => other,
        }
    }

    /// Resets every pool this allocator has handed sets out of and returns
    /// them to the free list, bulk-invalidating all of their sets. Caller
    /// contract: the frame fence covering those sets must have been waited on.
    pub fn reset_all(&mut self) -> GfxResult<()> {
        if let CurrentPool::Active(pool) =
            std::mem::replace(&mut self.current, CurrentPool::Unset)
        {
            self.used_pools.push(pool);
        }

        for pool in self.used_pools.drain(..) {
            pool.reset()?;
            self.free_pools.push(pool);
        }

        Ok(())
    }

    /// Consuming teardown: destroys every pool, used or free. Must only be
    /// called once no set from this allocator is referenced by in-flight
    /// work.
    pub fn destroy(mut self) {
        self.current = CurrentPool::Unset;
        self.free_pools.clear();
        self.used_pools.clear();
    }

    pub fn free_pool_count(&self) -> usize {
        self.free_pools.len()
    }

    pub fn used_pool_count(&self) -> usize {
        self.used_pools.len()
            + match self.current {
                CurrentPool::Active(_) => 1,
                CurrentPool::Unset => 0,
            }
    }
}

#[cfg(all(test, not(feature = "vulkan")))]
mod tests {
    use super::*;
    use crate::{
        ApiDef, DescriptorBindingDef, DescriptorSetLayoutDef, GfxApi, ShaderResourceType,
        ShaderStageFlags,
    };

    fn single_uniform_layout(device_context: &DeviceContext) -> DescriptorSetLayout {
        device_context
            .create_descriptor_set_layout(&DescriptorSetLayoutDef::new(vec![
                DescriptorBindingDef::new(
                    0,
                    ShaderResourceType::UniformBuffer,
                    ShaderStageFlags::ALL,
                ),
            ]))
            .unwrap()
    }

    #[test]
    fn exhaustion_acquires_exactly_one_extra_pool() {
        let api = unsafe { GfxApi::new(&ApiDef::default()).unwrap() };
        let layout = single_uniform_layout(api.device_context());

        let mut allocator = DescriptorPoolAllocator::new(
            api.device_context(),
            DescriptorPoolDef::from_set_budget(1000),
        );

        for _ in 0..1000 {
            allocator.allocate(&layout).unwrap();
        }
        assert_eq!(allocator.used_pool_count(), 1);

        // The 1001st allocation rolls over to a second pool and succeeds.
        allocator.allocate(&layout).unwrap();
        assert_eq!(allocator.used_pool_count(), 2);

        allocator.destroy();
        drop(layout);
    }

    #[test]
    fn reset_all_recycles_used_pools_before_creating_new_ones() {
        let api = unsafe { GfxApi::new(&ApiDef::default()).unwrap() };
        let layout = single_uniform_layout(api.device_context());

        let mut allocator = DescriptorPoolAllocator::new(
            api.device_context(),
            DescriptorPoolDef::from_set_budget(8),
        );

        for _ in 0..10 {
            allocator.allocate(&layout).unwrap();
        }
        assert_eq!(allocator.used_pool_count(), 2);

        allocator.reset_all().unwrap();
        assert_eq!(allocator.used_pool_count(), 0);
        assert_eq!(allocator.free_pool_count(), 2);

        // Freshly reclaimed capacity is served from recycled pools.
        allocator.allocate(&layout).unwrap();
        assert_eq!(allocator.used_pool_count(), 1);
        assert_eq!(allocator.free_pool_count(), 1);

        allocator.destroy();
        drop(layout);
    }

    #[test]
    fn allocate_lazily_acquires_the_first_pool() {
        let api = unsafe { GfxApi::new(&ApiDef::default()).unwrap() };
        let layout = single_uniform_layout(api.device_context());

        let mut allocator =
            DescriptorPoolAllocator::new(api.device_context(), DescriptorPoolDef::default());
        assert_eq!(allocator.used_pool_count(), 0);

        allocator.allocate(&layout).unwrap();
        assert_eq!(allocator.used_pool_count(), 1);

        allocator.destroy();
        drop(layout);
    }
}
