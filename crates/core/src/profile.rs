//! Static evaluation profiles keyed by the candidate's selection string.
//!
//! The table is immutable and defined at compile time. Callers that receive
//! an unknown selection use [`resolve`], which falls back to generic
//! defaults instead of failing the stage.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProfileKind {
    Language,
    Framework,
    Track,
}

impl ProfileKind {
    pub const ALL: [ProfileKind; 3] = [ProfileKind::Language, ProfileKind::Framework, ProfileKind::Track];
}

impl std::fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileKind::Language => write!(f, "Language"),
            ProfileKind::Framework => write!(f, "Framework"),
            ProfileKind::Track => write!(f, "Track"),
        }
    }
}

/// Evaluation configuration for one selectable technology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionProfile {
    pub name: &'static str,
    pub kind: ProfileKind,
    /// One-line description shown in the selection picker.
    pub description: &'static str,
    /// Used verbatim in question-generation prompts.
    pub topics: &'static [&'static str],
    /// Remote execution runtime; `None` means only static evaluation applies.
    pub execution_language_id: Option<&'static str>,
    /// Tag for markdown code fences around starter code.
    pub code_fence_language: &'static str,
    pub challenge_style: &'static str,
    pub starter_template: &'static str,
}

pub static PROFILES: &[SelectionProfile] = &[
    // ── Languages ─────────────────────────────────────────────
    SelectionProfile {
        name: "JavaScript",
        kind: ProfileKind::Language,
        description: "Versatile for web and beyond.",
        topics: &[
            "scopes and closures",
            "event loop and microtasks",
            "promises vs async/await",
            "array/object manipulation",
            "ES modules vs CommonJS",
            "this binding and arrow functions",
        ],
        execution_language_id: Some("javascript"),
        code_fence_language: "javascript",
        challenge_style: "Algorithmic or data-structure problem solvable in 20 minutes.",
        starter_template: "function solve(input) {\n  // TODO: implement\n  return null;\n}\n\n// Example usage:\n// console.log(solve(/* your input */));\n",
    },
    SelectionProfile {
        name: "TypeScript",
        kind: ProfileKind::Language,
        description: "Typed superset of JavaScript.",
        topics: &["types vs interfaces", "generics", "narrowing", "utility types", "modules", "strict mode"],
        execution_language_id: Some("typescript"),
        code_fence_language: "typescript",
        challenge_style: "Algorithm with type-safe function signature.",
        starter_template: "export function solve<T>(input: T): unknown {\n  // TODO: implement\n  return null;\n}\n",
    },
    SelectionProfile {
        name: "Python",
        kind: ProfileKind::Language,
        description: "Great for data, backend, scripting.",
        topics: &[
            "data structures",
            "list/dict/set comprehensions",
            "decorators",
            "generators/iterators",
            "OOP basics",
            "virtual env",
        ],
        execution_language_id: Some("python"),
        code_fence_language: "python",
        challenge_style: "Algorithmic function or simple class method.",
        starter_template: "def solve(input):\n    \"\"\"TODO: implement\"\"\"\n    return None\n\nif __name__ == \"__main__\":\n    pass\n",
    },
    SelectionProfile {
        name: "Java",
        kind: ProfileKind::Language,
        description: "Enterprise-grade OOP language.",
        topics: &["OOP", "collections framework", "generics", "streams", "exceptions", "JVM basics"],
        execution_language_id: Some("java"),
        code_fence_language: "java",
        challenge_style: "Class with a static method implementing the algorithm.",
        starter_template: "public class Solution {\n    public static Object solve(Object input) {\n        // TODO: implement\n        return null;\n    }\n}\n",
    },
    SelectionProfile {
        name: "C++",
        kind: ProfileKind::Language,
        description: "High performance systems programming.",
        topics: &[
            "value vs reference",
            "RAII",
            "STL containers/algorithms",
            "smart pointers",
            "move semantics",
        ],
        execution_language_id: Some("cpp"),
        code_fence_language: "cpp",
        challenge_style: "Function implementing the algorithm; prefer STL.",
        starter_template: "#include <bits/stdc++.h>\nusing namespace std;\n\nauto solve(/* your params */) {\n    // TODO: implement\n    return 0;\n}\n\nint main(){\n    // cout << solve(...);\n    return 0;\n}\n",
    },
    SelectionProfile {
        name: "C#",
        kind: ProfileKind::Language,
        description: "Modern language for .NET ecosystem.",
        topics: &["LINQ", "async/await", "collections", "OOP", "generics", "memory management basics"],
        execution_language_id: Some("csharp"),
        code_fence_language: "csharp",
        challenge_style: "Static method in a class; use LINQ where suitable.",
        starter_template: "public static class Solution {\n    public static object Solve(object input) {\n        // TODO: implement\n        return null;\n    }\n}\n",
    },
    SelectionProfile {
        name: "Go",
        kind: ProfileKind::Language,
        description: "Fast, simple, and concurrent.",
        topics: &[
            "goroutines and channels",
            "interfaces",
            "slices vs arrays",
            "error handling",
            "packages/modules",
        ],
        execution_language_id: Some("go"),
        code_fence_language: "go",
        challenge_style: "Function with clear signature and tests in mind.",
        starter_template: "package main\n\nfunc Solve(input any) any {\n    // TODO: implement\n    return nil\n}\n\nfunc main() {}\n",
    },
    SelectionProfile {
        name: "Rust",
        kind: ProfileKind::Language,
        description: "Memory-safe and fast systems.",
        topics: &[
            "ownership and borrowing",
            "lifetimes (intro)",
            "Option/Result",
            "iterators",
            "collections",
        ],
        execution_language_id: Some("rust"),
        code_fence_language: "rust",
        challenge_style: "Function with clear types and Result where appropriate.",
        starter_template: "pub fn solve<T>(_input: T) -> Option<String> {\n    // TODO: implement\n    None\n}\n\nfn main() {}\n",
    },
    // ── Frameworks ────────────────────────────────────────────
    SelectionProfile {
        name: "React",
        kind: ProfileKind::Framework,
        description: "Component-driven UI library for the web.",
        topics: &[
            "hooks (useState, useEffect)",
            "props vs state",
            "memoization",
            "keys & lists",
            "controlled components",
            "performance",
        ],
        execution_language_id: Some("javascript"),
        code_fence_language: "tsx",
        challenge_style: "Build a small functional component with props and state.",
        starter_template: "import { useState } from 'react';\n\nexport function Widget({ initial }: { initial: number }) {\n  const [value, setValue] = useState(initial);\n  // TODO: implement required behavior\n  return <div>{value}</div>;\n}\n",
    },
    SelectionProfile {
        name: "Angular",
        kind: ProfileKind::Framework,
        description: "Full-featured web app framework by Google.",
        topics: &[
            "components",
            "modules",
            "dependency injection",
            "RxJS basics",
            "templates",
            "routing basics",
        ],
        execution_language_id: Some("typescript"),
        code_fence_language: "typescript",
        challenge_style: "Implement a service or component method with RxJS.",
        starter_template: "import { Injectable } from '@angular/core';\nimport { Observable, of } from 'rxjs';\n\n@Injectable({ providedIn: 'root' })\nexport class ExampleService {\n  fetch(): Observable<string> {\n    // TODO: implement\n    return of('');\n  }\n}\n",
    },
    SelectionProfile {
        name: "Vue",
        kind: ProfileKind::Framework,
        description: "Progressive framework for building UIs.",
        topics: &[
            "reactivity",
            "computed vs watch",
            "components/props",
            "composition API basics",
            "routing basics",
        ],
        execution_language_id: Some("javascript"),
        code_fence_language: "javascript",
        challenge_style: "Implement a composable or component logic.",
        starter_template: "export default {\n  name: 'Widget',\n  props: { initial: Number },\n  data() { return { value: this.initial } },\n  // TODO: implement behavior\n}\n",
    },
    SelectionProfile {
        name: "Svelte",
        kind: ProfileKind::Framework,
        description: "Compiler for truly reactive web apps.",
        topics: &["reactivity with $", "props", "stores basics", "bindings", "events"],
        execution_language_id: Some("javascript"),
        code_fence_language: "javascript",
        challenge_style: "Small component logic demonstrating reactivity.",
        starter_template: "<script>\n  export let initial = 0;\n  let value = initial;\n  // TODO: implement behavior\n</script>\n\n<div>{value}</div>\n",
    },
    SelectionProfile {
        name: "Next.js",
        kind: ProfileKind::Framework,
        description: "React framework for SSR/SSG and routing.",
        topics: &[
            "routing",
            "data fetching (SSR/SSG)",
            "API routes basics",
            "metadata",
            "dynamic routes",
        ],
        execution_language_id: Some("javascript"),
        code_fence_language: "typescript",
        challenge_style: "Implement a simple server component or API handler.",
        starter_template: "export async function GET() {\n  // TODO: implement API handler\n  return new Response(JSON.stringify({ ok: true }));\n}\n",
    },
    SelectionProfile {
        name: "Express.js",
        kind: ProfileKind::Framework,
        description: "Minimal and flexible Node.js web framework.",
        topics: &[
            "routing",
            "middleware",
            "error handling",
            "request validation",
            "async handlers",
        ],
        execution_language_id: Some("javascript"),
        code_fence_language: "javascript",
        challenge_style: "Implement an Express route handler/middleware.",
        starter_template: "export function handler(req, res, next) {\n  try {\n    // TODO: implement\n    res.json({ ok: true });\n  } catch (err) { next(err); }\n}\n",
    },
    SelectionProfile {
        name: "NestJS",
        kind: ProfileKind::Framework,
        description: "Structured Node.js framework with TypeScript.",
        topics: &[
            "modules/controllers/services",
            "decorators",
            "providers/DI",
            "pipes/guards basics",
        ],
        execution_language_id: Some("typescript"),
        code_fence_language: "typescript",
        challenge_style: "Implement a service method or controller handler.",
        starter_template: "import { Injectable } from '@nestjs/common';\n\n@Injectable()\nexport class ExampleService {\n  compute(input: unknown): unknown {\n    // TODO: implement\n    return null;\n  }\n}\n",
    },
    SelectionProfile {
        name: "Django",
        kind: ProfileKind::Framework,
        description: "Batteries-included Python web framework.",
        topics: &[
            "models",
            "ORM queries",
            "views basics",
            "forms/validation basics",
            "settings & migrations",
        ],
        execution_language_id: Some("python"),
        code_fence_language: "python",
        challenge_style: "Implement a model method or view logic.",
        starter_template: "from django.http import JsonResponse\n\ndef handler(request):\n    # TODO: implement\n    return JsonResponse({ 'ok': True })\n",
    },
    SelectionProfile {
        name: "Flask",
        kind: ProfileKind::Framework,
        description: "Lightweight Python web microframework.",
        topics: &["routing", "request/response", "blueprints basics", "validation basics"],
        execution_language_id: Some("python"),
        code_fence_language: "python",
        challenge_style: "Implement a route function.",
        starter_template: "from flask import Flask, request, jsonify\napp = Flask(__name__)\n\n@app.route('/task', methods=['POST'])\ndef task():\n    # TODO: implement\n    return jsonify({ 'ok': True })\n",
    },
    SelectionProfile {
        name: "FastAPI",
        kind: ProfileKind::Framework,
        description: "High-performance APIs with Python type hints.",
        topics: &[
            "path/query/body params",
            "Pydantic models basics",
            "responses",
            "dependency injection basics",
        ],
        execution_language_id: Some("python"),
        code_fence_language: "python",
        challenge_style: "Implement an endpoint function.",
        starter_template: "from fastapi import FastAPI\napp = FastAPI()\n\n@app.get('/status')\ndef status():\n    # TODO: implement\n    return { 'ok': True }\n",
    },
    SelectionProfile {
        name: "Spring Boot",
        kind: ProfileKind::Framework,
        description: "Rapid Java backend development framework.",
        topics: &[
            "controllers",
            "services",
            "dependency injection",
            "REST basics",
            "validation basics",
        ],
        execution_language_id: Some("java"),
        code_fence_language: "java",
        challenge_style: "Implement a service method or controller handler.",
        starter_template: "import org.springframework.web.bind.annotation.*;\n\n@RestController\npublic class ExampleController {\n    @GetMapping(\"/status\")\n    public Object status() {\n        // TODO: implement\n        return java.util.Map.of(\"ok\", true);\n    }\n}\n",
    },
    SelectionProfile {
        name: "ASP.NET Core",
        kind: ProfileKind::Framework,
        description: "Cross-platform, high-performance .NET web.",
        topics: &[
            "controllers",
            "dependency injection",
            "middleware basics",
            "routing",
            "model binding",
        ],
        execution_language_id: Some("csharp"),
        code_fence_language: "csharp",
        challenge_style: "Implement a controller action or service method.",
        starter_template: "using Microsoft.AspNetCore.Mvc;\n\n[ApiController]\n[Route(\"api/[controller]\")]\npublic class StatusController : ControllerBase {\n    [HttpGet]\n    public IActionResult Get() {\n        // TODO: implement\n        return Ok(new { ok = true });\n    }\n}\n",
    },
    SelectionProfile {
        name: "Ruby on Rails",
        kind: ProfileKind::Framework,
        description: "Convention-over-configuration web framework.",
        topics: &[
            "MVC basics",
            "ActiveRecord",
            "routes",
            "controllers/actions",
            "validations",
        ],
        execution_language_id: Some("ruby"),
        code_fence_language: "ruby",
        challenge_style: "Implement a controller action or model validation.",
        starter_template: "class StatusController < ApplicationController\n  def show\n    # TODO: implement\n    render json: { ok: true }\n  end\nend\n",
    },
    SelectionProfile {
        name: "Laravel",
        kind: ProfileKind::Framework,
        description: "Expressive PHP framework for the web.",
        topics: &[
            "routing",
            "controllers",
            "Eloquent basics",
            "validation",
            "service container basics",
        ],
        execution_language_id: Some("php"),
        code_fence_language: "php",
        challenge_style: "Implement a controller method.",
        starter_template: "<?php\n\nnamespace App\\Http\\Controllers;\n\nuse Illuminate\\Http\\Request;\n\nclass StatusController extends Controller {\n    public function show(Request $request) {\n        // TODO: implement\n        return response()->json(['ok' => true]);\n    }\n}\n",
    },
    // ── Tracks ────────────────────────────────────────────────
    SelectionProfile {
        name: "Full-Stack (MERN)",
        kind: ProfileKind::Track,
        description: "MongoDB, Express, React, Node.",
        topics: &[
            "MongoDB basics",
            "Express routing",
            "React components",
            "Node async patterns",
            "RESTful design",
        ],
        execution_language_id: Some("javascript"),
        code_fence_language: "javascript",
        challenge_style: "Implement an Express route or React utility related to MERN tasks.",
        starter_template: "// Express route handler example\nexport function handler(req, res) {\n  // TODO: implement\n  res.json({ ok: true });\n}\n",
    },
    SelectionProfile {
        name: "Data Science (Python)",
        kind: ProfileKind::Track,
        description: "Pandas, NumPy, ML basics.",
        topics: &["NumPy", "Pandas", "data cleaning", "basic ML", "visualization basics"],
        execution_language_id: Some("python"),
        code_fence_language: "python",
        challenge_style: "Implement a function manipulating a dataset (no external files).",
        starter_template: "def transform(df):\n    \"\"\"df: pandas.DataFrame -> pandas.DataFrame\"\"\"\n    # TODO: implement\n    return df\n",
    },
    SelectionProfile {
        name: "Android (Kotlin)",
        kind: ProfileKind::Track,
        description: "Native Android development.",
        topics: &[
            "activities/fragments basics",
            "coroutines",
            "ViewModel basics",
            "collections and null-safety",
        ],
        execution_language_id: Some("kotlin"),
        code_fence_language: "kotlin",
        challenge_style: "Implement a pure Kotlin function or small class method (no Android framework required).",
        starter_template: "object Solution {\n    fun solve(input: Any?): Any? {\n        // TODO: implement\n        return null\n    }\n}\n",
    },
    SelectionProfile {
        name: "iOS (Swift)",
        kind: ProfileKind::Track,
        description: "Native iOS development.",
        topics: &["optionals", "structs/classes", "protocols", "value semantics", "collections"],
        execution_language_id: Some("swift"),
        code_fence_language: "swift",
        challenge_style: "Implement a pure Swift function (no UIKit/SwiftUI required).",
        starter_template: "func solve(_ input: Any?) -> Any? {\n    // TODO: implement\n    return nil\n}\n",
    },
];

/// Exact, case-sensitive lookup of a selection's profile.
pub fn lookup(selection: &str) -> Option<&'static SelectionProfile> {
    PROFILES.iter().find(|p| p.name == selection)
}

pub const GENERIC_TOPIC_LINE: &str = "Focus on core language/framework fundamentals.";
pub const GENERIC_CHALLENGE_STYLE: &str = "Algorithmic problem with a clear function signature.";

/// The prompt-facing view of a selection, with defaults for unknown entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProfile {
    pub selection: String,
    pub profile: Option<&'static SelectionProfile>,
    pub code_fence_language: String,
    pub challenge_style: String,
    pub starter_template: String,
}

impl ResolvedProfile {
    /// "Focus on these topics: ..." or the generic fundamentals line.
    pub fn topics_line(&self) -> String {
        match self.profile {
            Some(p) => format!("Focus on these topics: {}.", p.topics.join(", ")),
            None => GENERIC_TOPIC_LINE.to_string(),
        }
    }

    /// Interviewer role framing for question generation.
    pub fn role_line(&self) -> String {
        match self.profile {
            Some(p) => format!(
                "You are a senior interviewer for an entry-level {} candidate in {}.",
                p.kind.to_string().to_lowercase(),
                self.selection
            ),
            None => format!(
                "You are a senior interviewer for an entry-level {} candidate.",
                self.selection
            ),
        }
    }
}

/// Resolve a selection, never failing: unknown selections get a generic
/// topic line, a generic challenge style, an empty starter, and the
/// lower-cased selection as a best-effort language id.
pub fn resolve(selection: &str) -> ResolvedProfile {
    match lookup(selection) {
        Some(p) => ResolvedProfile {
            selection: selection.to_string(),
            profile: Some(p),
            code_fence_language: p.code_fence_language.to_string(),
            challenge_style: p.challenge_style.to_string(),
            starter_template: p.starter_template.to_string(),
        },
        None => ResolvedProfile {
            selection: selection.to_string(),
            profile: None,
            code_fence_language: selection.to_lowercase(),
            challenge_style: GENERIC_CHALLENGE_STYLE.to_string(),
            starter_template: String::new(),
        },
    }
}

/// Every selectable profile in picker order.
pub fn options() -> &'static [SelectionProfile] {
    PROFILES
}

/// Picker filter: case-insensitive substring match over name and
/// description, optionally restricted to one kind. Table order is kept.
pub fn filter_options(query: &str, kind: Option<ProfileKind>) -> Vec<&'static SelectionProfile> {
    let needle = query.trim().to_lowercase();
    PROFILES
        .iter()
        .filter(|p| kind.map_or(true, |k| p.kind == k))
        .filter(|p| {
            needle.is_empty()
                || p.name.to_lowercase().contains(&needle)
                || p.description.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_entry_has_topics_and_starter() {
        for p in PROFILES {
            assert!(!p.topics.is_empty(), "{} has no topics", p.name);
            assert!(!p.starter_template.trim().is_empty(), "{} has no starter", p.name);
            assert!(!p.challenge_style.is_empty());
        }
    }

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = PROFILES.iter().map(|p| p.name).collect();
        assert_eq!(names.len(), PROFILES.len());
        assert_eq!(PROFILES.len(), 26);
    }

    #[test]
    fn lookup_is_exact() {
        assert_eq!(lookup("Python").unwrap().kind, ProfileKind::Language);
        assert_eq!(lookup("React").unwrap().code_fence_language, "tsx");
        assert!(lookup("python").is_none());
        assert!(lookup("COBOL").is_none());
    }

    #[test]
    fn resolve_unknown_uses_defaults() {
        let r = resolve("Elixir");
        assert!(r.profile.is_none());
        assert_eq!(r.code_fence_language, "elixir");
        assert_eq!(r.challenge_style, GENERIC_CHALLENGE_STYLE);
        assert!(r.starter_template.is_empty());
        assert_eq!(r.topics_line(), GENERIC_TOPIC_LINE);
        assert!(r.role_line().contains("entry-level Elixir candidate"));
    }

    #[test]
    fn resolve_known_frames_by_kind() {
        let r = resolve("Full-Stack (MERN)");
        assert!(r.role_line().contains("entry-level track candidate in Full-Stack (MERN)"));
        assert!(r.topics_line().starts_with("Focus on these topics: MongoDB basics"));
    }

    #[test]
    fn filter_by_query_and_kind() {
        let py: Vec<_> = filter_options("python", None).iter().map(|p| p.name).collect();
        assert!(py.contains(&"Python"));
        assert!(py.contains(&"Django"));
        assert!(py.contains(&"Data Science (Python)"));

        let tracks = filter_options("", Some(ProfileKind::Track));
        assert_eq!(tracks.len(), 4);

        let py_frameworks: Vec<_> = filter_options("Python", Some(ProfileKind::Framework))
            .iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(py_frameworks, vec!["Django", "Flask", "FastAPI"]);
    }
}
