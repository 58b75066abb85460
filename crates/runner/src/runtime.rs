/// Map a selection to its Piston language id.
///
/// Frameworks and tracks run on their base language. The table is static,
/// so the answer for a given selection never changes within a process.
pub fn resolve_runtime(selection: &str) -> Option<&'static str> {
    let id = match selection {
        // Languages
        "JavaScript" => "javascript",
        "TypeScript" => "typescript",
        "Python" => "python",
        "Java" => "java",
        "C++" => "cpp",
        "C#" => "csharp",
        "Go" => "go",
        "Rust" => "rust",
        "PHP" => "php",
        "Ruby" => "ruby",
        "Kotlin" => "kotlin",
        "Swift" => "swift",

        // Frameworks
        "React" | "Vue" | "Svelte" | "Next.js" | "Express.js" => "javascript",
        "Angular" | "NestJS" => "typescript",
        "Django" | "Flask" | "FastAPI" => "python",
        "Spring Boot" => "java",
        "ASP.NET Core" => "csharp",
        "Ruby on Rails" => "ruby",
        "Laravel" => "php",

        // Tracks
        "Full-Stack (MERN)" => "javascript",
        "Data Science (Python)" => "python",
        "Android (Kotlin)" => "kotlin",
        "iOS (Swift)" => "swift",

        _ => return None,
    };
    Some(id)
}
