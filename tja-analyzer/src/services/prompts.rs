//! Fixed instruction prompts sent with camera snapshots

/// Main extraction prompt: one JSON object with Title, Date and Traffic
pub const ANALYSIS_PROMPT: &str = "You are analyzing a CCTV traffic camera image. Your task is to extract and return a single, valid JSON object with the following fields: 'Title', 'Traffic', and 'Date'.

Instructions:
- 'Title': Extract ONLY the text visible in the top left corner of the image and assign it to this field.
- 'Date': Extract ONLY the text visible in the bottom right corner of the image and assign it to this field.
- 'Traffic': Analyze the visible road area and estimate the current traffic level as an integer from 0 (no traffic) to 100 (maximum congestion), based on the number of vehicles and the degree of congestion you observe.

Requirements:
- The image is from a real-time traffic CCTV camera. Focus on the road and vehicles for the 'Traffic' value.
- Do NOT include any information not visible in the image.
- Return ONLY a single valid JSON object, with no extra text, explanation, or markdown formatting.
- The JSON must have exactly these three fields: 'Title', 'Date', and 'Traffic'.

Example output:
{\"Title\": \"3M-TVM-21 (Túnel 3 de Mayo)\", \"Date\": \"12/06/2025 18:47\", \"Traffic\": 0}
";

/// Single-field prompt for the camera name (top-left text)
pub const TITLE_PROMPT: &str = "You are analyzing a CCTV traffic camera image. Your task is to extract and return ONLY the text visible in the top left corner of the image as a plain string. Do NOT return JSON, Markdown, HTML, or any explanation. Only the text itself.\nSample output: '3M-TVM-21 (Túnel 3 de Mayo)'";

/// Single-field prompt for the camera timestamp (bottom-right text)
pub const DATE_PROMPT: &str = "You are analyzing a CCTV traffic camera image. Your task is to extract and return ONLY the text visible in the bottom right corner of the image as a plain string. The text represents a Date. Do NOT return JSON, Markdown, HTML, or any explanation. Only the date string.\nSample output: '12/06/2025 18:47'";

/// Single-field prompt for the congestion estimate
pub const TRAFFIC_PROMPT: &str = "You are analyzing a CCTV traffic camera image. Your task is to analyze the visible road area and return ONLY the estimated current traffic level as an integer from 0 (no traffic) to 100 (maximum congestion). Do NOT return JSON, Markdown, HTML, or any explanation. Only the integer value.\nSample output: '0'\nSample output: '77'";
