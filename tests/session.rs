use ptrid::library::{Metric, ReferenceLibrary};
use ptrid::packet::{TCP_FIN, TCP_RST};
use ptrid::session::{HttpClassifier, Verdict};
use std::fs;
use tempfile::tempdir;

const CLIENT: [u8; 4] = [10, 0, 0, 1];
const SERVER: [u8; 4] = [10, 0, 0, 2];
const CLIENT_PORT: u16 = 40123;
const SERVER_PORT: u16 = 80;

fn tcp_frame(
    src: [u8; 4],
    src_port: u16,
    dst: [u8; 4],
    dst_port: u16,
    flags: u8,
    payload: &[u8],
) -> Vec<u8> {
    let mut frame = vec![0u8; 12];
    frame.extend_from_slice(&[0x08, 0x00]);

    let total_len = (20 + 20 + payload.len()) as u16;
    let mut ip = [0u8; 20];
    ip[0] = 0x45;
    ip[2..4].copy_from_slice(&total_len.to_be_bytes());
    ip[8] = 64;
    ip[9] = 6;
    ip[12..16].copy_from_slice(&src);
    ip[16..20].copy_from_slice(&dst);
    frame.extend_from_slice(&ip);

    let mut tcp = [0u8; 20];
    tcp[0..2].copy_from_slice(&src_port.to_be_bytes());
    tcp[2..4].copy_from_slice(&dst_port.to_be_bytes());
    tcp[12] = 5 << 4;
    tcp[13] = flags;
    frame.extend_from_slice(&tcp);

    frame.extend_from_slice(payload);
    frame
}

fn request_frame(payload: &[u8]) -> Vec<u8> {
    tcp_frame(CLIENT, CLIENT_PORT, SERVER, SERVER_PORT, 0, payload)
}

fn response_frame(flags: u8, payload: &[u8]) -> Vec<u8> {
    tcp_frame(SERVER, SERVER_PORT, CLIENT, CLIENT_PORT, flags, payload)
}

/// Classifier over two trained types ("a"-heavy and "b"-heavy) plus the
/// synthetic random type, scored by Markov log-likelihood.
fn classifier() -> HttpClassifier {
    let root = tempdir().unwrap();
    let dir_a = root.path().join("type_a");
    let dir_b = root.path().join("type_b");
    fs::create_dir(&dir_a).unwrap();
    fs::create_dir(&dir_b).unwrap();
    fs::write(dir_a.join("train.bin"), "a".repeat(200)).unwrap();
    fs::write(dir_b.join("train.bin"), "b".repeat(200)).unwrap();
    let library =
        ReferenceLibrary::build(&[dir_a, dir_b], Metric::MarkovLogLikelihood).unwrap();
    HttpClassifier::new(library)
}

fn feed(classifier: &mut HttpClassifier, frame: &[u8]) -> Option<Verdict> {
    classifier.process(frame, frame.len())
}

#[test]
fn get_request_opens_a_session() {
    let mut classifier = classifier();
    let frame = request_frame(b"GET /index.html HTTP/1.1\r\nHost: example\r\n\r\n");
    let verdict = feed(&mut classifier, &frame).unwrap();
    assert_eq!(
        verdict,
        Verdict::Opened {
            request_line: b"GET /index.html HTTP/1.1\r\n".to_vec()
        }
    );
    assert_eq!(classifier.open_sessions(), 1);
}

#[test]
fn request_without_newline_keeps_the_whole_payload() {
    let mut classifier = classifier();
    let frame = request_frame(b"GET /x");
    let verdict = feed(&mut classifier, &frame).unwrap();
    assert_eq!(
        verdict,
        Verdict::Opened {
            request_line: b"GET /x".to_vec()
        }
    );
}

#[test]
fn data_without_a_session_is_dropped() {
    let mut classifier = classifier();
    let frame = request_frame(&b"a".repeat(64));
    assert_eq!(feed(&mut classifier, &frame), None);
    assert_eq!(classifier.open_sessions(), 0);
}

#[test]
fn non_ip_frames_are_ignored() {
    let mut classifier = classifier();
    let mut frame = request_frame(b"GET /x\n");
    frame[12] = 0x86; // EtherType IPv6
    frame[13] = 0xdd;
    assert_eq!(feed(&mut classifier, &frame), None);
}

#[test]
fn response_start_is_scored_standalone() {
    let mut classifier = classifier();
    feed(&mut classifier, &request_frame(b"GET /data HTTP/1.1\r\n\r\n")).unwrap();

    let mut payload = b"HTTP/1.1 200 OK\r\n\r\n".to_vec();
    payload.extend_from_slice(&b"a".repeat(60));
    let verdict = feed(&mut classifier, &response_frame(0, &payload)).unwrap();
    assert_eq!(
        verdict,
        Verdict::Classified {
            request_line: b"GET /data HTTP/1.1\r\n".to_vec(),
            type_index: 0
        }
    );
    assert_eq!(classifier.open_sessions(), 1);
}

#[test]
fn body_segments_accumulate_and_classify() {
    let mut classifier = classifier();
    feed(&mut classifier, &request_frame(b"GET /data HTTP/1.1\r\n\r\n")).unwrap();

    let verdict = feed(&mut classifier, &response_frame(0, &b"a".repeat(48))).unwrap();
    assert_eq!(
        verdict,
        Verdict::Classified {
            request_line: b"GET /data HTTP/1.1\r\n".to_vec(),
            type_index: 0
        }
    );

    // More body data keeps refining the same accumulated vector.
    let verdict = feed(&mut classifier, &response_frame(0, &b"a".repeat(48))).unwrap();
    assert!(matches!(verdict, Verdict::Classified { type_index: 0, .. }));
    assert_eq!(classifier.open_sessions(), 1);
}

#[test]
fn short_payloads_skip_scoring() {
    let mut classifier = classifier();
    feed(&mut classifier, &request_frame(b"GET /data HTTP/1.1\r\n\r\n")).unwrap();

    let verdict = feed(&mut classifier, &response_frame(0, b"tiny")).unwrap();
    assert_eq!(
        verdict,
        Verdict::Skipped {
            request_line: b"GET /data HTTP/1.1\r\n".to_vec()
        }
    );
    assert_eq!(classifier.open_sessions(), 1);
}

#[test]
fn fin_closes_the_session_after_processing() {
    let mut classifier = classifier();
    feed(&mut classifier, &request_frame(b"GET /data HTTP/1.1\r\n\r\n")).unwrap();

    // The FIN packet still classifies its own payload, then retires the
    // session.
    let verdict = feed(&mut classifier, &response_frame(TCP_FIN, &b"a".repeat(48))).unwrap();
    assert!(matches!(verdict, Verdict::Classified { type_index: 0, .. }));
    assert_eq!(classifier.open_sessions(), 0);

    // Follow-up data on the retired conversation is dropped.
    assert_eq!(feed(&mut classifier, &response_frame(0, &b"a".repeat(48))), None);
}

#[test]
fn rst_closes_the_session_too() {
    let mut classifier = classifier();
    feed(&mut classifier, &request_frame(b"GET /data HTTP/1.1\r\n\r\n")).unwrap();

    let verdict = feed(&mut classifier, &response_frame(TCP_RST, b"")).unwrap();
    assert!(matches!(verdict, Verdict::Skipped { .. }));
    assert_eq!(classifier.open_sessions(), 0);
}

#[test]
fn sessions_are_keyed_per_conversation() {
    let mut classifier = classifier();
    feed(&mut classifier, &request_frame(b"GET /one\n")).unwrap();

    // A second client port is a different conversation.
    let other = tcp_frame(CLIENT, CLIENT_PORT + 1, SERVER, SERVER_PORT, 0, b"GET /two\n");
    feed(&mut classifier, &other).unwrap();
    assert_eq!(classifier.open_sessions(), 2);

    let verdict = feed(&mut classifier, &response_frame(0, &b"b".repeat(48))).unwrap();
    assert_eq!(
        verdict,
        Verdict::Classified {
            request_line: b"GET /one\n".to_vec(),
            type_index: 1
        }
    );
}
