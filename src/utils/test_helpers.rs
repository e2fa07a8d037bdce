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

/// Helper macro to skip tests that need a live host named by an environment variable.
///
/// Expands to the variable's value when set.
#[macro_export]
macro_rules! require_env {
    ($var:expr) => {
        match std::env::var($var) {
            Ok(value) if !value.is_empty() => value,
            _ => {
                eprintln!("Test requires {} to be set, skipping...", $var);
                return;
            }
        }
    };
}

/// Helper macro to skip tests when a binary is missing from PATH
#[macro_export]
macro_rules! skip_without_binary {
    ($name:expr) => {
        if !$crate::utils::test_helpers::binary_available($name) {
            eprintln!("Test requires `{}` on PATH, skipping...", $name);
            return;
        }
    };
}

/// Whether `name` resolves to an executable file on PATH.
pub fn binary_available(name: &str) -> bool {
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(name).is_file()))
        .unwrap_or(false)
}
