//! Découpage du texte SOSI en arbre d'éléments
//!
//! Une ligne qui commence par un ou plusieurs `.` suivis d'un nom ouvre un
//! élément dont le niveau est le nombre de points. Les autres lignes non
//! vides sont des lignes de données rattachées à l'élément ouvert le plus
//! profond. Les commentaires `!` hors guillemets sont ignorés.

/// Élément SOSI (`.KURVE 1:`, `..NØ`, `...ENHET 0.01`, ...)
#[derive(Debug, Clone, PartialEq)]
pub struct Element<'a> {
    /// Nombre de points en tête de ligne
    pub level: usize,
    /// Nom de l'élément, sans les points
    pub tag: &'a str,
    /// Reste de la ligne après le nom
    pub value: &'a str,
    /// Numéro de ligne (1-based)
    pub line: usize,
    /// Lignes de données qui suivent l'élément, avec leur numéro
    pub data: Vec<(usize, &'a str)>,
    pub children: Vec<Element<'a>>,
}

impl<'a> Element<'a> {
    fn new(level: usize, tag: &'a str, value: &'a str, line: usize) -> Self {
        Self {
            level,
            tag,
            value,
            line,
            data: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Premier descendant portant ce nom (parcours en profondeur)
    pub fn find(&self, tag: &str) -> Option<&Element<'a>> {
        for child in &self.children {
            if child.tag == tag {
                return Some(child);
            }
            if let Some(found) = child.find(tag) {
                return Some(found);
            }
        }
        None
    }

    /// Enfants directs dont le nom fait partie de `tags`
    pub fn children_tagged<'s>(
        &'s self,
        tags: &'s [&'s str],
    ) -> impl Iterator<Item = &'s Element<'a>> + 's {
        self.children.iter().filter(move |c| tags.contains(&c.tag))
    }

    /// Valeur de la ligne puis lignes de données, avec numéros de ligne
    pub fn value_lines(&self) -> impl Iterator<Item = (usize, &'a str)> + '_ {
        std::iter::once((self.line, self.value))
            .chain(self.data.iter().copied())
            .filter(|(_, text)| !text.is_empty())
    }

    /// Tous les mots de la valeur et des lignes de données
    pub fn tokens(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.value_lines()
            .flat_map(|(_, text)| text.split_whitespace())
    }
}

/// Découpe un document en éléments de premier niveau
pub fn tokenize(content: &str) -> Vec<Element<'_>> {
    let mut roots: Vec<Element<'_>> = Vec::new();
    let mut stack: Vec<Element<'_>> = Vec::new();

    for (idx, raw_line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        match split_element(line) {
            Some((level, tag, value)) => {
                close_until(&mut stack, &mut roots, level);
                stack.push(Element::new(level, tag, value, line_no));
            }
            None => match stack.last_mut() {
                Some(open) => open.data.push((line_no, line)),
                None => tracing::trace!(line = line_no, "Data line outside of any element"),
            },
        }
    }

    close_until(&mut stack, &mut roots, 0);
    roots
}

/// Ferme les éléments ouverts de niveau >= `level`
fn close_until<'a>(stack: &mut Vec<Element<'a>>, roots: &mut Vec<Element<'a>>, level: usize) {
    while stack.last().is_some_and(|open| open.level >= level) {
        let Some(done) = stack.pop() else {
            break;
        };
        match stack.last_mut() {
            Some(parent) => parent.children.push(done),
            None => roots.push(done),
        }
    }
}

/// `..NØ 10 20` -> (2, "NØ", "10 20"), `None` pour une ligne de données
fn split_element(line: &str) -> Option<(usize, &str, &str)> {
    let rest = line.trim_start_matches('.');
    let level = line.len() - rest.len();
    if level == 0 || !rest.chars().next().is_some_and(char::is_alphabetic) {
        return None;
    }

    let tag_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    Some((level, &rest[..tag_end], rest[tag_end..].trim()))
}

/// Supprime un commentaire `!` situé hors guillemets
fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '!' if !in_quotes => return &line[..i],
            _ => {}
        }
    }
    line
}
