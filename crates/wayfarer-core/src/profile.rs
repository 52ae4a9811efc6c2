//! Static portfolio content shown in the location panels.

pub struct SkillCategory {
    pub title: &'static str,
    pub icon: &'static str,
    pub skills: &'static [&'static str],
}

pub struct Stat {
    pub name: &'static str,
    pub value: u8,
    pub flavor: &'static str,
}

pub struct ContactLink {
    pub label: &'static str,
    pub target: &'static str,
}

pub const BIO: &str = "My interest in software engineering began with the world of \
**hacking and penetration testing**. I learned to code by exploring vulnerabilities \
and understanding how to break systems. This foundation guides all my development \
work today.";

pub const STATS: &[Stat] = &[
    Stat { name: "STR", value: 12, flavor: "Keyboard Endurance" },
    Stat { name: "INT", value: 20, flavor: "Exploit Analysis" },
    Stat { name: "DEX", value: 15, flavor: "Rapid Injection" },
];

pub const HOBBIES: &[&str] = &["Programming", "Hacking", "Wrestling"];

pub const SKILL_CATEGORIES: &[SkillCategory] = &[
    SkillCategory {
        title: "Frontend",
        icon: ">_",
        skills: &["JavaScript", "TypeScript", "HTML", "CSS", "Tailwind", "React", "Bootstrap"],
    },
    SkillCategory {
        title: "Backend",
        icon: "☕",
        skills: &["Node.js", "C# .NET", "Python", "Java", "C"],
    },
    SkillCategory {
        title: "Tools",
        icon: "⚒",
        skills: &["Git", "Docker", "Kali Linux", "Visual Studio", "VirtualBox", "VMware"],
    },
    SkillCategory {
        title: "Operating Systems",
        icon: "▣",
        skills: &["Windows", "Linux"],
    },
];

pub const CONTACT_LINKS: &[ContactLink] = &[
    ContactLink { label: "GitHub", target: "https://github.com/" },
    ContactLink { label: "Gmail", target: "mailto:your.email@gmail.com" },
    ContactLink { label: "Twitter", target: "https://twitter.com/" },
];

/// Every skill in display order, flattened across categories.
pub fn all_skills() -> impl Iterator<Item = &'static str> {
    SKILL_CATEGORIES.iter().flat_map(|c| c.skills.iter().copied())
}

pub fn skill_count() -> usize {
    SKILL_CATEGORIES.iter().map(|c| c.skills.len()).sum()
}

/// Skill at a flattened index, as used by the skills panel cursor.
pub fn skill_at(index: usize) -> Option<&'static str> {
    all_skills().nth(index)
}
