// Canned stream payloads for integration testing

use serde_json::{json, Value};

/// One SSE frame as it appears on the wire
#[allow(dead_code)] // Used in integration tests
pub fn sse_frame(event: &str, data: &Value) -> String {
    format!("event: {event}\ndata: {data}\n\n")
}

/// Match item JSON as the server sends it
#[allow(dead_code)] // Used in integration tests
pub fn match_item(id: &str, name: &str, score: f64) -> Value {
    json!({
        "practitioner_id": id,
        "name": name,
        "headline": format!("{name} - Principal Consultant"),
        "email": null,
        "linkedin_url": format!("https://linkedin.example/{id}"),
        "location": "Seattle, WA",
        "skills": ["COBOL", "z/OS", "CICS"],
        "about": "",
        "match_score": score,
        "explanation": "",
        "explanation_status": "pending",
        "matched_keywords": ["cobol", "mainframe modernization"],
        "boost_factor": 1.2
    })
}

/// Explanation text in the current header style
#[allow(dead_code)] // Used in integration tests
pub const EXPLANATION: &str = "# Explicit LinkedIn Matches:
- Led payments migration at Bank X
- COBOL developer at First National (2009-2015)
# Inferred LinkedIn Matches:
- [List inferred matches here]
# LinkedIn Relevance Score: 8/10
# Explicit Crosslake Matches:
- No explicit Crosslake matches found
# Inferred Crosslake Matches:
- Mainframe assessment for a regional insurer
# Crosslake History Score: 5/10";

/// Same evidence in the older header style, without `#` markers
#[allow(dead_code)] // Used in integration tests
pub const LEGACY_EXPLANATION: &str = "Relevant LinkedIn History:
- Led payments migration at Bank X
LinkedIn Relevance Score: 7
Relevant Crosslake History:
- Core banking due diligence
Crosslake History Score: 4/10";

/// The full "COBOL mainframe" stream: 3 matches, 3 explanations, completion
#[allow(dead_code)] // Used in integration tests
pub fn cobol_stream() -> Vec<String> {
    let mut frames = vec![
        sse_frame(
            "status",
            &json!({"message": "Searching for practitioners...", "stage": "search"}),
        ),
        cobol_batch(),
    ];
    for (i, id) in ["p1", "p2", "p3"].iter().enumerate() {
        frames.push(explanation_frame(id, i + 1, 3));
    }
    frames.push(sse_frame(
        "stream_complete",
        &json!({"total_processing_time_ms": 4200, "explanations_generated": 3}),
    ));
    frames
}

#[allow(dead_code)] // Used in integration tests
pub fn cobol_batch() -> String {
    sse_frame(
        "match_results",
        &json!({
            "query": "COBOL mainframe",
            "matches": [
                match_item("p1", "Ada Lovelace", 91.4),
                match_item("p2", "Grace Hopper", 77.0),
                match_item("p3", "Jean Sammet", 52.5)
            ],
            "total_results": 3,
            "processing_time_ms": 180,
            "explanations_pending": true,
            "llm_search_terms": {
                "primary_concepts": ["COBOL", "mainframe"],
                "expanded_terms": ["z/OS", "CICS", "JCL"],
                "exact_matches": ["COBOL"],
                "domain_context": "legacy modernization",
                "confidence_score": 0.92
            }
        }),
    )
}

#[allow(dead_code)] // Used in integration tests
pub fn explanation_frame(id: &str, completed: usize, total: usize) -> String {
    sse_frame(
        "explanation_complete",
        &json!({
            "practitioner_id": id,
            "explanation": EXPLANATION,
            "completed": completed,
            "total": total,
            "processing_time_ms": 812.3
        }),
    )
}

/// Concatenated body bytes
#[allow(dead_code)] // Used in integration tests
pub fn body(frames: &[String]) -> Vec<u8> {
    frames.concat().into_bytes()
}
