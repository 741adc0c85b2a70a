use bytemuck::{Pod, Zeroable, cast_slice};
use mesh_forest::algs::communicator::{CommTag, Communicator, NoComm, RayonComm, Wait};
use serial_test::serial;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable, Debug, PartialEq, Eq)]
struct WireU64 {
    x: u64,
}

#[test]
fn no_comm_is_nop() {
    let comm = NoComm;
    assert!(comm.is_no_comm());
    let mut buf = [0u8; 8];
    let h = comm.irecv(0, 123, &mut buf);
    assert!(h.wait().is_none());
    let s = comm.isend(0, 123, &[]);
    assert!(s.wait().is_none());
}

#[test]
#[serial]
fn rayon_fifo_order() {
    let tag = CommTag(0x1001);
    let c0 = RayonComm::new(0, 2);
    let c1 = RayonComm::new(1, 2);
    assert!(!c0.is_no_comm());

    for i in 0..10u8 {
        c0.isend(1, tag.base(), &[i]);
    }
    let mut out = Vec::new();
    for _ in 0..10 {
        let mut b = [0u8; 1];
        let h = c1.irecv(0, tag.base(), &mut b);
        out.push(h.wait().unwrap()[0]);
    }
    assert_eq!(out, (0u8..10u8).collect::<Vec<_>>());
}

#[test]
#[serial]
fn truncation_is_ok() {
    let tag = CommTag(0x1002);
    let c0 = RayonComm::new(0, 2);
    let c1 = RayonComm::new(1, 2);

    c0.isend(1, tag.base(), &[1, 2, 3, 4, 5, 6]);
    let mut b = [0u8; 4];
    let got = c1.irecv(0, tag.base(), &mut b).wait().unwrap();
    assert_eq!(got, vec![1, 2, 3, 4]);
}

#[test]
#[serial]
fn rayon_comm_roundtrip_and_tag_isolation() {
    let c0 = RayonComm::new(0, 2);
    let c1 = RayonComm::new(1, 2);
    let tag = CommTag(0xA100);

    let mut buf_a = [0u8; core::mem::size_of::<WireU64>()];
    let mut buf_b = [0u8; core::mem::size_of::<WireU64>()];
    let rxa = c1.irecv(0, tag.base(), &mut buf_a);
    let rxb = c1.irecv(0, tag.offset(1), &mut buf_b);

    let wa = [WireU64 {
        x: 0xDEAD_BEEF_F00D_F00D,
    }];
    let wb = [WireU64 {
        x: 0x0123_4567_89AB_CDEF,
    }];
    c0.isend(1, tag.offset(1), cast_slice(&wb));
    c0.isend(1, tag.base(), cast_slice(&wa));

    assert_eq!(&rxa.wait().expect("rxa")[..], cast_slice(&wa));
    assert_eq!(&rxb.wait().expect("rxb")[..], cast_slice(&wb));
}

#[cfg(feature = "mpi-support")]
#[test]
fn mpi_broadcast_smoke() {
    use mesh_forest::algs::communicator::MpiComm;
    let world = MpiComm::new().expect("MPI initialization failed");
    let mut buf = if world.rank() == 0 { [4u8, 2] } else { [0u8; 2] };
    world.broadcast(0, 0, &mut buf).unwrap();
    assert_eq!(buf, [4, 2]);
}
