//! Visual presentation options: template, font and color theme.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    #[default]
    Melitta,
    Modern,
    Grace,
    Shakespeare,
    Feynman,
    Ampere,
    Minimal,
    Executive,
    Compact,
    Traditional,
    Tech,
    Serif,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Font {
    Times,
    Verdana,
    Georgia,
    Arial,
    Helvetica,
    #[default]
    Garamond,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontCategory {
    Serif,
    SansSerif,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Classic,
    Slate,
    Blue,
    #[default]
    Teal,
    Green,
}

impl Template {
    pub const ALL: [Template; 12] = [
        Template::Melitta,
        Template::Modern,
        Template::Grace,
        Template::Shakespeare,
        Template::Feynman,
        Template::Ampere,
        Template::Minimal,
        Template::Executive,
        Template::Compact,
        Template::Traditional,
        Template::Tech,
        Template::Serif,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Template::Melitta => "melitta",
            Template::Modern => "modern",
            Template::Grace => "grace",
            Template::Shakespeare => "shakespeare",
            Template::Feynman => "feynman",
            Template::Ampere => "ampere",
            Template::Minimal => "minimal",
            Template::Executive => "executive",
            Template::Compact => "compact",
            Template::Traditional => "traditional",
            Template::Tech => "tech",
            Template::Serif => "serif",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Template::Melitta => "Classic",
            Template::Modern => "Modern",
            Template::Grace => "Professional",
            Template::Shakespeare => "Elegant",
            Template::Feynman => "Academic",
            Template::Ampere => "Creative",
            Template::Minimal => "Minimal",
            Template::Executive => "Executive",
            Template::Compact => "Compact",
            Template::Traditional => "Traditional",
            Template::Tech => "Tech",
            Template::Serif => "Serif",
        }
    }

    /// Style key consumed by the renderer.
    pub fn style(self) -> &'static str {
        match self {
            Template::Melitta => "classic",
            Template::Grace => "professional",
            Template::Shakespeare => "elegant",
            Template::Feynman => "academic",
            Template::Ampere => "creative",
            other => other.id(),
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id() == id)
    }
}

impl Font {
    pub const ALL: [Font; 6] = [
        Font::Times,
        Font::Verdana,
        Font::Georgia,
        Font::Arial,
        Font::Helvetica,
        Font::Garamond,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Font::Times => "times",
            Font::Verdana => "verdana",
            Font::Georgia => "georgia",
            Font::Arial => "arial",
            Font::Helvetica => "helvetica",
            Font::Garamond => "garamond",
        }
    }

    pub fn family(self) -> &'static str {
        match self {
            Font::Times => "Times New Roman",
            Font::Verdana => "Verdana",
            Font::Georgia => "Georgia",
            Font::Arial => "Arial",
            Font::Helvetica => "Helvetica",
            Font::Garamond => "Garamond",
        }
    }

    pub fn category(self) -> FontCategory {
        match self {
            Font::Times | Font::Georgia | Font::Garamond => FontCategory::Serif,
            Font::Verdana | Font::Arial | Font::Helvetica => FontCategory::SansSerif,
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.id() == id)
    }
}

impl Theme {
    pub const ALL: [Theme; 5] = [
        Theme::Classic,
        Theme::Slate,
        Theme::Blue,
        Theme::Teal,
        Theme::Green,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Theme::Classic => "classic",
            Theme::Slate => "slate",
            Theme::Blue => "blue",
            Theme::Teal => "teal",
            Theme::Green => "green",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Classic => "Classic Black",
            Theme::Slate => "Corporate Gray",
            Theme::Blue => "Professional Blue",
            Theme::Teal => "Modern Teal",
            Theme::Green => "Fresh Green",
        }
    }

    pub fn text_color(self) -> &'static str {
        match self {
            Theme::Classic => "#000000",
            Theme::Slate => "#334155",
            Theme::Blue => "#1e3a8a",
            Theme::Teal => "#115e59",
            Theme::Green => "#166534",
        }
    }

    /// All themes print on white.
    pub fn background_color(self) -> &'static str {
        "#ffffff"
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id() == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Customization {
    #[serde(default)]
    pub template: Template,
    #[serde(default)]
    pub font: Font,
    #[serde(default)]
    pub theme: Theme,
}

/// Customization with every option expanded to what a renderer needs.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedCustomization {
    pub template: Template,
    pub template_name: &'static str,
    pub template_style: &'static str,
    pub font: Font,
    pub font_family: &'static str,
    pub font_category: FontCategory,
    pub theme: Theme,
    pub theme_name: &'static str,
    pub text_color: &'static str,
    pub background_color: &'static str,
}

impl Customization {
    pub fn resolve(self) -> ResolvedCustomization {
        ResolvedCustomization {
            template: self.template,
            template_name: self.template.name(),
            template_style: self.template.style(),
            font: self.font,
            font_family: self.font.family(),
            font_category: self.font.category(),
            theme: self.theme,
            theme_name: self.theme.name(),
            text_color: self.theme.text_color(),
            background_color: self.theme.background_color(),
        }
    }
}
