use kernel_alloc::{
    FrameIndex, KbaseMapper, LockedPool, Page, PageAllocator, PhysMapper, PhysMemPool, PoolLayout,
    metadata_from_raw,
};
use kernel_info::memory::PAGE_SIZE;
use kernel_memory_addresses::{PhysicalAddress, VirtualAddress};
use std::thread;

/// Aligned to well beyond the largest block of any pool below.
const BASE: u64 = 0xffff_ff00_8000_0000;

fn pages(n: usize) -> Vec<Page> {
    vec![Page::default(); n]
}

fn init<const N: usize>(metadata: &mut [Page], page_num: usize) -> PhysMemPool<'_, N> {
    PhysMemPool::init(metadata, VirtualAddress::new(BASE), page_num).unwrap()
}

fn frames_in(order: usize) -> u64 {
    1 << order
}

#[test]
fn four_frame_pool_splits_and_merges() {
    let mut metadata = pages(4);
    let mut pool = init::<3>(&mut metadata, 4);

    assert_eq!(pool.free_counts(), [0, 0, 1]);
    assert_eq!(pool.total_free_bytes(), 4 * PAGE_SIZE);

    let block = pool.acquire(0).unwrap();
    assert_eq!(pool.free_counts(), [1, 1, 0]);
    assert_eq!(pool.is_allocated(block), Some(true));
    assert_eq!(pool.order_of(block), Some(0));

    pool.release(block);
    assert_eq!(pool.free_counts(), [0, 0, 1]);
    assert_eq!(pool.total_free_bytes(), 4 * PAGE_SIZE);
}

#[test]
fn init_builds_maximal_blocks_for_odd_sizes() {
    // 13 = 8 + 4 + 1
    let mut metadata = pages(13);
    let pool = init::<4>(&mut metadata, 13);

    assert_eq!(pool.free_counts(), [1, 0, 1, 1]);
    assert_eq!(pool.total_free_bytes(), 13 * PAGE_SIZE);
    assert_eq!(pool.pool_mem_size(), 13 * PAGE_SIZE);
    assert_eq!(pool.page_count(), 13);

    assert_eq!(pool.free_blocks(3).collect::<Vec<_>>(), [FrameIndex::new(0)]);
    assert_eq!(pool.free_blocks(2).collect::<Vec<_>>(), [FrameIndex::new(8)]);
    assert_eq!(pool.free_blocks(0).collect::<Vec<_>>(), [FrameIndex::new(12)]);
}

#[test]
fn init_only_uses_the_first_page_num_records() {
    let mut metadata = pages(16);
    let pool = init::<3>(&mut metadata, 6);

    assert_eq!(pool.page_count(), 6);
    assert_eq!(pool.free_counts(), [0, 1, 1]);
}

#[test]
fn top_order_blocks_never_merge_further() {
    let mut metadata = pages(8);
    let pool = init::<2>(&mut metadata, 8);

    assert_eq!(pool.free_counts(), [0, 4]);
}

#[test]
fn accounting_holds_through_a_mixed_workload() {
    let mut metadata = pages(64);
    let mut pool = init::<5>(&mut metadata, 64);
    let total = pool.pool_mem_size();

    let mut held: Vec<(FrameIndex, usize)> = Vec::new();
    let mut allocated_bytes = 0;

    for order in [0, 3, 1, 0, 4, 2, 0, 1, 3, 0] {
        if let Some(block) = pool.acquire(order) {
            held.push((block, order));
            allocated_bytes += frames_in(order) * PAGE_SIZE;
        }
        assert_eq!(pool.total_free_bytes() + allocated_bytes, total);
    }

    // Release in an interleaved order.
    let mut i = 0;
    while !held.is_empty() {
        i = (i + 3) % held.len();
        let (block, order) = held.swap_remove(i);
        pool.release(block);
        allocated_bytes -= frames_in(order) * PAGE_SIZE;
        assert_eq!(pool.total_free_bytes() + allocated_bytes, total);
    }

    assert_eq!(pool.free_counts(), [0, 0, 0, 0, 4]);
}

#[test]
fn buddy_is_address_xor_block_size() {
    let mut metadata = pages(16);
    let mut pool = init::<5>(&mut metadata, 16);

    let a = pool.acquire(1).unwrap();
    let buddy = pool.buddy_of(a).unwrap();

    let a_addr = pool.frame_index_to_address(a).unwrap().as_u64();
    let buddy_addr = pool.frame_index_to_address(buddy).unwrap().as_u64();
    assert_eq!(buddy_addr, a_addr ^ (PAGE_SIZE << 1));
    assert_eq!(pool.order_of(buddy), Some(1));
    assert_eq!(pool.is_allocated(buddy), Some(false));
}

#[test]
fn buddy_outside_the_pool_is_none() {
    // 3 frames: frames 0-1 form an order-1 block, frame 2 has no buddy.
    let mut metadata = pages(3);
    let mut pool = init::<3>(&mut metadata, 3);
    assert_eq!(pool.free_counts(), [1, 1, 0]);

    let lone = pool.acquire(0).unwrap();
    assert_eq!(lone, FrameIndex::new(2));
    // Its order-0 buddy is frame 3, past the end.
    assert_eq!(pool.buddy_of(lone), None);

    pool.release(lone);
    assert_eq!(pool.free_counts(), [1, 1, 0]);
}

#[test]
fn indices_past_the_pool_are_rejected() {
    let mut metadata = pages(4);
    let pool = init::<3>(&mut metadata, 4);
    let past = FrameIndex::new(9);

    assert_eq!(pool.buddy_of(past), None);
    assert_eq!(pool.frame_index_to_address(past), None);
    assert_eq!(pool.frame_index_to_address(FrameIndex::new(4)), None);
    assert_eq!(pool.is_allocated(past), None);
    assert_eq!(pool.order_of(past), None);

    let pool = LockedPool::new(pool);
    assert_eq!(pool.page_to_virt(past), None);
    assert_eq!(
        pool.page_to_virt(FrameIndex::new(3)),
        Some(VirtualAddress::new(BASE + 3 * PAGE_SIZE))
    );
}

#[test]
fn start_below_largest_block_alignment_round_trips() {
    // Frames sit at pages 1..=7 relative to an aligned base: page 0 is the
    // missing buddy of pages 1, 2-3 and 4-7.
    let start = VirtualAddress::new(BASE + PAGE_SIZE);
    let mut metadata = pages(7);
    let mut pool = PhysMemPool::<4>::init(&mut metadata, start, 7).unwrap();

    assert_eq!(pool.free_counts(), [1, 1, 1, 0]);
    assert_eq!(pool.free_blocks(0).collect::<Vec<_>>(), [FrameIndex::new(0)]);
    assert_eq!(pool.free_blocks(1).collect::<Vec<_>>(), [FrameIndex::new(1)]);
    assert_eq!(pool.free_blocks(2).collect::<Vec<_>>(), [FrameIndex::new(3)]);
    assert_eq!(pool.acquire(3), None);

    let held: Vec<_> = (0..7).map(|_| pool.acquire(0).unwrap()).collect();
    assert_eq!(pool.total_free_bytes(), 0);
    assert_eq!(pool.acquire(0), None);

    for block in held {
        pool.release(block);
    }
    assert_eq!(pool.free_counts(), [1, 1, 1, 0]);
    assert_eq!(pool.total_free_bytes(), 7 * PAGE_SIZE);
}

#[test]
fn split_then_release_both_halves_restores_the_block() {
    let mut metadata = pages(16);
    let mut pool = init::<5>(&mut metadata, 16);

    // Leave the pool with one order-2 block free and a few allocations around.
    let big = pool.acquire(3).unwrap();
    let mid = pool.acquire(2).unwrap();
    let before = pool.free_counts();
    assert_eq!(before, [0, 0, 1, 0, 0]);

    let lo = pool.acquire(1).unwrap();
    let hi = pool.acquire(1).unwrap();
    assert_eq!(pool.free_counts(), [0, 0, 0, 0, 0]);

    pool.release(lo);
    pool.release(hi);
    assert_eq!(pool.free_counts(), before);

    pool.release(mid);
    pool.release(big);
    assert_eq!(pool.free_counts(), [0, 0, 0, 0, 1]);
}

#[test]
fn exhaustion_leaves_free_lists_untouched() {
    let mut metadata = pages(4);
    let mut pool = init::<3>(&mut metadata, 4);

    let snapshot = |pool: &PhysMemPool<'_, 3>| {
        (0..3)
            .map(|o| pool.free_blocks(o).collect::<Vec<_>>())
            .collect::<Vec<_>>()
    };

    let before = snapshot(&pool);
    assert_eq!(pool.acquire(3), None);
    assert_eq!(pool.acquire(usize::MAX), None);
    assert_eq!(snapshot(&pool), before);

    let _a = pool.acquire(1).unwrap();
    let _b = pool.acquire(0).unwrap();
    let before = snapshot(&pool);
    assert_eq!(pool.free_counts(), [1, 0, 0]);

    assert_eq!(pool.acquire(1), None);
    assert_eq!(pool.acquire(2), None);
    assert_eq!(snapshot(&pool), before);
}

#[test]
fn address_translation_is_pure_arithmetic() {
    let mut metadata = pages(8);
    let pool = init::<4>(&mut metadata, 8);

    let third = FrameIndex::new(3);
    let addr = pool.frame_index_to_address(third).unwrap();
    assert_eq!(addr, VirtualAddress::new(BASE + 3 * PAGE_SIZE));

    assert_eq!(pool.address_to_frame_index(addr), Some(third));
    assert_eq!(pool.address_to_frame_index(addr + 0x123), Some(third));
    assert_eq!(pool.address_to_frame_index(VirtualAddress::new(BASE - 1)), None);
    assert_eq!(
        pool.address_to_frame_index(VirtualAddress::new(BASE + 8 * PAGE_SIZE)),
        None
    );
}

#[test]
fn get_pages_and_free_pages_speak_addresses() {
    let mut metadata = pages(4);
    let mut pool = init::<3>(&mut metadata, 4);

    let addr = pool.get_pages(1).unwrap();
    assert_eq!(pool.total_free_bytes(), 2 * PAGE_SIZE);
    assert!(pool.address_to_frame_index(addr).is_some());

    pool.free_pages(addr);
    assert_eq!(pool.total_free_bytes(), 4 * PAGE_SIZE);

    // Outside the pool: logged and ignored.
    pool.free_pages(VirtualAddress::new(BASE + 64 * PAGE_SIZE));
    assert_eq!(pool.free_counts(), [0, 0, 1]);
}

#[test]
fn carved_region_backs_a_pool() {
    let region_len = 40 * PAGE_SIZE;
    let layout = PoolLayout::carve(VirtualAddress::new(BASE), region_len).unwrap();
    assert!(layout.page_num > 0);

    // The metadata lives in host memory here; only the frame addresses are fake.
    let mut backing = pages(layout.page_num);
    let metadata = unsafe { metadata_from_raw(backing.as_mut_ptr(), layout.page_num) };

    let pool = PhysMemPool::<BUDDY_TEST_ORDER>::init(metadata, layout.pool_start, layout.page_num)
        .unwrap();
    assert_eq!(pool.total_free_bytes(), layout.pool_size());
    assert!(pool.pool_start_addr().as_u64() + pool.pool_mem_size() <= BASE + region_len);
}

const BUDDY_TEST_ORDER: usize = 6;

#[test]
fn direct_map_translation_of_allocated_frames() {
    let mut metadata = pages(4);
    let pool = LockedPool::new(init::<3>(&mut metadata, 4));

    let va = pool.get_page().unwrap();
    let pa = KbaseMapper.virt_to_phys(va);
    assert_eq!(pa, PhysicalAddress::new(0x8000_0000 + (va.as_u64() - BASE)));
    assert_eq!(KbaseMapper.phys_to_virt(pa), va);

    pool.free_page(va);
    assert_eq!(pool.free_counts(), [0, 0, 1]);
}

#[test]
fn locked_pool_releases_its_lock_between_calls() {
    let mut metadata = pages(8);
    let pool = LockedPool::new(init::<4>(&mut metadata, 8));

    let block = pool.acquire(2).unwrap();
    assert!(pool.lock().is_allocated(block).unwrap());
    assert_eq!(pool.page_to_virt(block), Some(VirtualAddress::new(BASE)));
    assert_eq!(pool.virt_to_page(VirtualAddress::new(BASE)), Some(block));

    pool.release(block);
    assert_eq!(pool.total_free_bytes(), 8 * PAGE_SIZE);
    assert!(pool.to_string().contains("1 in O3"));
}

#[test]
fn concurrent_acquire_and_release_keep_the_pool_consistent() {
    const THREADS: usize = 4;
    const ROUNDS: usize = 500;

    let mut metadata = pages(256);
    let pool = LockedPool::new(init::<7>(&mut metadata, 256));
    let total = pool.total_free_bytes();

    thread::scope(|s| {
        for t in 0..THREADS {
            let pool = &pool;
            s.spawn(move || {
                let mut held = Vec::new();
                for round in 0..ROUNDS {
                    let order = (t + round) % 3;
                    if let Some(addr) = pool.get_pages(order) {
                        held.push(addr);
                    }
                    if held.len() > 4 {
                        pool.free_pages(held.remove(0));
                    }
                }
                for addr in held {
                    pool.free_pages(addr);
                }
            });
        }
    });

    let pool = pool.into_inner();
    assert_eq!(pool.total_free_bytes(), total);
    assert_eq!(pool.free_counts(), [0, 0, 0, 0, 0, 0, 4]);
}
