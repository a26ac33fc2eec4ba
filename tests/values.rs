//! Value, stream and unwrap behaviour.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use yawl::runtime::{ByteStream, Value, materialize, unwrap};

#[tokio::test]
async fn tee_views_are_byte_identical_and_independent() {
    let source = ByteStream::from_bytes(Bytes::from_static(b"stream body"));
    let mut views = source.tee(3);
    // Closing one branch must not disturb the others.
    drop(views.pop());
    for view in views {
        assert_eq!(view.collect().await, Bytes::from_static(b"stream body"));
    }
}

#[tokio::test]
async fn reader_pump_delivers_everything() {
    let data = b"0123456789".repeat(1000);
    let stream = ByteStream::from_reader(std::io::Cursor::new(data.clone()), 256);
    assert_eq!(stream.collect().await, Bytes::from(data));
}

#[tokio::test]
async fn deferred_values_compute_exactly_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let value = Value::deferred(async move {
        counter.fetch_add(1, Ordering::SeqCst);
        Value::Text("computed".into())
    });

    // Two consumers share one computation.
    let twin = value.clone();
    let a = unwrap(value, 16).await;
    let b = unwrap(twin, 16).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(a.into_bytes().await, b.into_bytes().await);
}

#[tokio::test]
async fn unwrap_depth_guard_returns_the_value_unresolved() {
    fn nest(levels: usize) -> Value {
        if levels == 0 {
            Value::Text("bottom".into())
        } else {
            Value::deferred(async move { nest(levels - 1) })
        }
    }
    let shallow = unwrap(nest(3), 16).await;
    assert!(matches!(shallow, Value::Text(_)));

    let cut_off = unwrap(nest(10), 2).await;
    assert!(matches!(cut_off, Value::Deferred(_)));
}

#[tokio::test]
async fn unwrap_leaves_streams_as_handles() {
    let v = Value::Stream(ByteStream::from_bytes(Bytes::from_static(b"xyz")));
    match unwrap(v, 16).await {
        Value::Stream(s) => assert_eq!(s.collect().await, Bytes::from_static(b"xyz")),
        other => panic!("expected a stream handle, got {other:?}"),
    }
}

#[tokio::test]
async fn materialize_drains_streams_inside_tuples() {
    let v = Value::Tuple(vec![
        Value::Stream(ByteStream::from_bytes(Bytes::from_static(b"ab"))),
        Value::Null,
        Value::Text("c".into()),
    ]);
    let concrete = materialize(v, 16).await;
    assert_eq!(concrete.into_bytes().await, Bytes::from_static(b"abc\n"));
}

#[tokio::test]
async fn scalar_bytes_are_newline_terminated() {
    assert_eq!(
        Value::Text("hi".into()).into_bytes().await,
        Bytes::from_static(b"hi\n")
    );
    assert_eq!(
        Value::Text("hi\n".into()).into_bytes().await,
        Bytes::from_static(b"hi\n")
    );
    assert_eq!(Value::Null.into_bytes().await, Bytes::new());
}
