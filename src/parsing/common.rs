// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Common parsing utilities for tokenizing command output and number extraction.

use std::str::FromStr;

/// Parse a number from a string after sanitizing by removing commas, underscores, and trimming.
/// Returns None if parsing fails.
pub fn parse_number<T: FromStr>(s: &str) -> Option<T> {
    let cleaned = s.trim().replace([',', '_'], "");
    cleaned.parse::<T>().ok()
}

/// Split a line on `separator`, trim each field and drop the empty ones.
///
/// Empty fields vanish positionally: `"| a || b |"` yields `["a", "b"]`.
pub fn split_nonempty_fields(line: &str, separator: char) -> Vec<&str> {
    line.split(separator)
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .collect()
}

/// Canonical column token: lower-cased, spaces and slashes become underscores.
pub fn normalize_header(header: &str) -> String {
    header
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '/' { '_' } else { c })
        .collect()
}
