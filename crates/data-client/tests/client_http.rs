//! HTTP-level tests for the chunked data client
//!
//! A mock object store serves metadata and byte-ranged slices of a synthetic
//! interleaved blob; hit-count expectations pin down the caching and
//! de-duplication properties.

use ephys_charts_data::{ChunkedDataClient, DEFAULT_CHUNK_SIZE};
use ephys_charts_shared::ChartsError;

const SHAPE: usize = 5000;
const CHANNELS: usize = 3;

/// uint16 blob, row-major `[timepoint][channel]`, sample(t, c) = t*3 + c.
fn test_blob() -> Vec<u8> {
    let mut blob = Vec::with_capacity(SHAPE * CHANNELS * 2);
    for t in 0..SHAPE {
        for c in 0..CHANNELS {
            blob.extend_from_slice(&((t * CHANNELS + c) as u16).to_le_bytes());
        }
    }
    blob
}

async fn mock_metadata(server: &mut mockito::ServerGuard) -> mockito::Mock {
    server
        .mock("GET", "/dataset.json")
        .with_header("content-type", "application/json")
        .with_body(r#"{"shape": [5000, 3], "dtype": "uint16"}"#)
        .create_async()
        .await
}

/// Mock a single chunk's byte-range request against the blob.
async fn mock_chunk(
    server: &mut mockito::ServerGuard,
    blob: &[u8],
    chunk: usize,
    hits: usize,
) -> mockito::Mock {
    let byte_start = chunk * DEFAULT_CHUNK_SIZE * CHANNELS * 2;
    let byte_end = ((chunk + 1) * DEFAULT_CHUNK_SIZE).min(SHAPE) * CHANNELS * 2 - 1;
    server
        .mock("GET", "/dataset.dat")
        .match_header("range", format!("bytes={byte_start}-{byte_end}").as_str())
        .with_status(206)
        .with_body(&blob[byte_start..=byte_end])
        .expect(hits)
        .create_async()
        .await
}

async fn initialized_client(server: &mockito::ServerGuard) -> ChunkedDataClient {
    let mut client = ChunkedDataClient::new(
        format!("{}/dataset.json", server.url()),
        format!("{}/dataset.dat", server.url()),
    );
    client.initialize().await.unwrap();
    client
}

#[tokio::test]
async fn fetch_range_stitches_across_chunk_boundary() {
    let mut server = mockito::Server::new_async().await;
    let blob = test_blob();
    let _meta = mock_metadata(&mut server).await;
    let m0 = mock_chunk(&mut server, &blob, 0, 1).await;
    let m1 = mock_chunk(&mut server, &blob, 1, 1).await;

    let client = initialized_client(&server).await;
    assert_eq!(client.shape().unwrap(), SHAPE);
    assert_eq!(client.num_channels().unwrap(), CHANNELS);

    let samples = client.fetch_range(950, 1050, 1).await.unwrap();
    assert_eq!(samples.len(), 100);
    for i in 0..100 {
        let t = 950 + i;
        assert_eq!(samples.value(i), (t * CHANNELS + 1) as f64, "timepoint {t}");
    }

    // Exactly chunks 0 and 1, nothing else.
    m0.assert_async().await;
    m1.assert_async().await;
}

#[tokio::test]
async fn concurrent_overlapping_fetches_share_chunk_requests() {
    let mut server = mockito::Server::new_async().await;
    let blob = test_blob();
    let _meta = mock_metadata(&mut server).await;
    let m0 = mock_chunk(&mut server, &blob, 0, 1).await;
    let m1 = mock_chunk(&mut server, &blob, 1, 1).await;

    let client = initialized_client(&server).await;

    // Both requests cover chunk 0; the second must join the first's fetch.
    let (a, b) = tokio::join!(
        client.fetch_range(0, 1500, 0),
        client.fetch_range(500, 1200, 2)
    );
    let a = a.unwrap();
    let b = b.unwrap();
    assert_eq!(a.len(), 1500);
    assert_eq!(b.len(), 700);
    assert_eq!(b.value(0), (500 * CHANNELS + 2) as f64);

    m0.assert_async().await;
    m1.assert_async().await;
}

#[tokio::test]
async fn cached_chunks_are_not_refetched() {
    let mut server = mockito::Server::new_async().await;
    let blob = test_blob();
    let _meta = mock_metadata(&mut server).await;
    let m0 = mock_chunk(&mut server, &blob, 0, 1).await;

    let client = initialized_client(&server).await;
    let first = client.fetch_range(10, 20, 0).await.unwrap();
    let second = client.fetch_range(10, 20, 0).await.unwrap();
    assert_eq!(first, second);

    m0.assert_async().await;
}

#[tokio::test]
async fn failed_chunk_fetch_can_be_retried() {
    let mut server = mockito::Server::new_async().await;
    let blob = test_blob();
    let _meta = mock_metadata(&mut server).await;
    let failing = server
        .mock("GET", "/dataset.dat")
        .match_header("range", "bytes=0-5999")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let client = initialized_client(&server).await;
    let err = client.fetch_range(0, 100, 0).await.unwrap_err();
    assert!(matches!(err, ChartsError::Fetch { status: Some(500), .. }));

    // A newer mock takes priority; the retry must go back to the network
    // because the failure cleared the in-flight marker and nothing was cached.
    let recovered = mock_chunk(&mut server, &blob, 0, 1).await;
    let samples = client.fetch_range(0, 100, 0).await.unwrap();
    assert_eq!(samples.len(), 100);

    failing.assert_async().await;
    recovered.assert_async().await;
}

#[tokio::test]
async fn contract_errors() {
    let mut server = mockito::Server::new_async().await;
    let _meta = mock_metadata(&mut server).await;

    let uninitialized = ChunkedDataClient::new(
        format!("{}/dataset.json", server.url()),
        format!("{}/dataset.dat", server.url()),
    );
    assert!(matches!(
        uninitialized.fetch_range(0, 10, 0).await.unwrap_err(),
        ChartsError::Uninitialized
    ));

    let client = initialized_client(&server).await;
    assert!(matches!(
        client.fetch_range(0, 10, 3).await.unwrap_err(),
        ChartsError::InvalidChannel {
            channel: 3,
            num_channels: 3
        }
    ));
    assert!(matches!(
        client.fetch_range(0, SHAPE + 1, 0).await.unwrap_err(),
        ChartsError::InvalidRange { .. }
    ));
    assert!(matches!(
        client.fetch_range(50, 50, 0).await.unwrap_err(),
        ChartsError::InvalidRange { .. }
    ));
}

#[tokio::test]
async fn metadata_rejects_unsupported_dtype() {
    let mut server = mockito::Server::new_async().await;
    let _meta = server
        .mock("GET", "/dataset.json")
        .with_body(r#"{"shape": 100, "dtype": "float64"}"#)
        .create_async()
        .await;

    let mut client = ChunkedDataClient::new(
        format!("{}/dataset.json", server.url()),
        format!("{}/dataset.dat", server.url()),
    );
    let err = client.initialize().await.unwrap_err();
    assert!(matches!(err, ChartsError::Metadata { .. }));
}

#[tokio::test]
async fn benchmark_results_feed_parses_records() {
    let mut server = mockito::Server::new_async().await;
    let _results = server
        .mock("GET", "/benchmark_results.json")
        .with_header("content-type", "application/json")
        .with_body(
            r#"[{
                "dataset": "aind-np2",
                "algorithm": "wavpack-hybrid",
                "compression_ratio": 3.7,
                "encode_time": 0.01,
                "decode_time": 0.02,
                "encode_mb_per_sec": 400.0,
                "decode_mb_per_sec": 200.0,
                "original_size": 1000000,
                "compressed_size": 270270,
                "rmse": 2.4,
                "max_error": 11.0,
                "reconstructed_url_raw": "https://store.example/r.dat"
            }]"#,
        )
        .create_async()
        .await;

    let http = reqwest::Client::new();
    let url = format!("{}/benchmark_results.json", server.url());
    let results = ephys_charts_data::fetch_benchmark_results(&http, &url)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].supports_comparison());

    let candidates = ephys_charts_data::comparison_candidates(&results, "aind-np2");
    assert_eq!(candidates.len(), 1);
}

#[tokio::test]
async fn scalar_shape_defaults_to_one_channel() {
    let mut server = mockito::Server::new_async().await;
    let _meta = server
        .mock("GET", "/dataset.json")
        .with_body(r#"{"shape": 2000, "dtype": "float32"}"#)
        .create_async()
        .await;

    let mut client = ChunkedDataClient::new(
        format!("{}/dataset.json", server.url()),
        format!("{}/dataset.dat", server.url()),
    );
    let meta = client.initialize().await.unwrap();
    assert_eq!(meta.num_channels, 1);
    assert_eq!(meta.shape, 2000);
}
