//! Shared test support utilities.
//!
//! Builds a small Java model through the snapshot loader, so integration
//! tests run against the same index the CLI uses.

#![allow(dead_code)]

use remotelink_core::index::CodeIndex;
use remotelink_core::model::{MethodId, Visibility};
use remotelink_core::snapshot::ModelSnapshot;
use remotelink_core::InMemoryIndex;
use serde_json::json;

pub const REMOTE_TEXT: &str =
    "package com.intellij.driver.client;\n\npublic @interface Remote {\n  String value();\n}\n";

pub const API_TEXT: &str = r#"package pkg;

@Remote("pkg.Impl")
public interface Api {
  void op(int a);
  void ping(int level);
}
"#;

pub const IMPL_TEXT: &str = r#"package pkg;

public class Impl {
  public void op(int a) {}
  public void op(int a, int b) {}
  private void op(long a) {}
  protected void ping(int level) {}
}
"#;

pub const BASE_TEXT: &str = r#"package pkg;

@Remote("pkg.Base")
public interface BaseApi {
  void run(String task);
}

public class Base {
  public void run(String task) {}
}

public class Derived extends Base {
  public void run(String task) {}
}

public class Other {
  public void run(String task) {}
}
"#;

pub const LAYERED_TEXT: &str = r#"package pkg;

@Remote("pkg.Leaf")
public interface LeafApi {
  void work(int n);
}

public class Root {
  public void work(int n) {}
  public void work(long n) {}
}

public class Leaf extends Root {
}
"#;

pub const TEST_TEXT: &str = r#"package pkg;

public class ImplTest extends Impl {
  public void op(int a) {}
}
"#;

/// The snapshot JSON of the sample model.
pub fn sample_snapshot() -> serde_json::Value {
    json!({
        "schema_version": 1,
        "files": [
            {
                "path": "lib/Remote.java",
                "package": "com.intellij.driver.client",
                "origin": "library",
                "text": REMOTE_TEXT,
                "classes": [{
                    "name": "com.intellij.driver.client.Remote",
                    "methods": [{ "name": "value", "parameters": 0, "abstract": true }]
                }]
            },
            {
                "path": "src/pkg/Api.java",
                "package": "pkg",
                "text": API_TEXT,
                "classes": [{
                    "name": "pkg.Api",
                    "interface": true,
                    "annotations": [{
                        "name": "com.intellij.driver.client.Remote",
                        "attributes": { "value": { "string": "pkg.Impl" } }
                    }],
                    "methods": [
                        { "name": "op", "parameters": 1, "abstract": true },
                        { "name": "ping", "parameters": 1, "abstract": true }
                    ]
                }]
            },
            {
                "path": "src/pkg/Impl.java",
                "package": "pkg",
                "text": IMPL_TEXT,
                "classes": [{
                    "name": "pkg.Impl",
                    "methods": [
                        { "name": "op", "parameters": 1 },
                        { "name": "op", "parameters": 2 },
                        { "name": "op", "parameters": 1, "visibility": "private" },
                        { "name": "ping", "parameters": 1, "visibility": "protected" }
                    ]
                }]
            },
            {
                "path": "src/pkg/Base.java",
                "package": "pkg",
                "text": BASE_TEXT,
                "classes": [
                    {
                        "name": "pkg.BaseApi",
                        "interface": true,
                        "annotations": [{
                            "name": "com.intellij.driver.client.Remote",
                            "attributes": { "value": { "string": "pkg.Base" } }
                        }],
                        "methods": [{ "name": "run", "parameters": 1, "abstract": true }]
                    },
                    {
                        "name": "pkg.Base",
                        "methods": [{ "name": "run", "parameters": 1 }]
                    },
                    {
                        "name": "pkg.Derived",
                        "supertypes": ["pkg.Base"],
                        "methods": [{ "name": "run", "parameters": 1 }]
                    },
                    {
                        "name": "pkg.Other",
                        "methods": [{ "name": "run", "parameters": 1 }]
                    }
                ]
            },
            {
                "path": "src/pkg/Layered.java",
                "package": "pkg",
                "text": LAYERED_TEXT,
                "classes": [
                    {
                        "name": "pkg.LeafApi",
                        "interface": true,
                        "annotations": [{
                            "name": "com.intellij.driver.client.Remote",
                            "attributes": { "value": { "string": "pkg.Leaf" } }
                        }],
                        "methods": [{ "name": "work", "parameters": 1, "abstract": true }]
                    },
                    {
                        "name": "pkg.Root",
                        "methods": [
                            { "name": "work", "parameters": 1 },
                            { "name": "work", "parameters": 1 }
                        ]
                    },
                    {
                        "name": "pkg.Leaf",
                        "supertypes": ["pkg.Root"]
                    }
                ]
            },
            {
                "path": "test/pkg/ImplTest.java",
                "package": "pkg",
                "origin": "test",
                "text": TEST_TEXT,
                "classes": [{
                    "name": "pkg.ImplTest",
                    "supertypes": ["pkg.Impl"],
                    "methods": [{ "name": "op", "parameters": 1 }]
                }]
            }
        ]
    })
}

/// Load the sample model.
pub fn sample_index() -> InMemoryIndex {
    let snapshot: ModelSnapshot =
        serde_json::from_value(sample_snapshot()).expect("sample snapshot parses");
    snapshot.to_index().expect("sample snapshot loads")
}

/// Find a declared method by owner, name, arity and visibility.
pub fn method_with(
    index: &InMemoryIndex,
    class: &str,
    name: &str,
    parameters: usize,
    visibility: Visibility,
) -> MethodId {
    let class = index
        .class_by_name(class)
        .unwrap_or_else(|| panic!("class {} is indexed", class));
    index
        .declared_methods(class.class_id)
        .into_iter()
        .find(|id| {
            index.method(*id).is_some_and(|m| {
                m.name == name && m.parameter_count == parameters && m.visibility == visibility
            })
        })
        .unwrap_or_else(|| {
            panic!(
                "method {}#{}/{} is indexed",
                class.qualified_name, name, parameters
            )
        })
}

/// Find a public or abstract declared method by owner, name and arity.
pub fn method(index: &InMemoryIndex, class: &str, name: &str, parameters: usize) -> MethodId {
    method_with(index, class, name, parameters, Visibility::Public)
}

/// Text covered by a span of a file.
pub fn text_at(index: &InMemoryIndex, path: &str, start: u64, end: u64) -> String {
    let file = index.file_by_path(path).expect("file is indexed");
    file.text[start as usize..end as usize].to_string()
}
