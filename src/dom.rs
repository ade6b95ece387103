use maud::{html, Markup};

/// Whether an element is rendered with `display: none`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Shown,
    Hidden,
}

impl Visibility {
    pub fn style(&self) -> Option<&'static str> {
        match self {
            Visibility::Shown => None,
            Visibility::Hidden => Some("display: none"),
        }
    }
}

/// An element of the host page whose children are owned by one view.
#[derive(Debug, Clone)]
pub struct Container {
    id: &'static str,
    class: Option<&'static str>,
    children: Vec<Markup>,
}

impl Container {
    pub fn new(id: &'static str) -> Self {
        Container {
            id,
            class: None,
            children: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: &'static str) -> Self {
        self.class = Some(class);
        self
    }

    pub fn append(&mut self, child: Markup) {
        self.children.push(child);
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn render(&self) -> Markup {
        html! {
            div id=(self.id) class=[self.class] {
                @for child in &self.children {
                    (child)
                }
            }
        }
    }
}
