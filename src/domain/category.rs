use serde::Serialize;

type Group = (&'static str, &'static [&'static str]);

/// Top-level sections of the catalog, each split into groups of example categories.
const CATEGORY_TREE: &[(&str, &[Group])] = &[
    (
        "Fruits",
        &[
            ("Seasonal Fruits", &["Mango", "Watermelon", "Litchi", "Papaya", "Guava"]),
            ("Non-Seasonal Fruits", &["Banana", "Apple", "Orange", "Grapes", "Pomegranate"]),
            ("By-products", &["Jams & Jellies", "Dried Fruits", "Juices", "Fruit Powders"]),
        ],
    ),
    (
        "Vegetables",
        &[
            ("Leafy", &["Spinach", "Mint", "Coriander", "Fenugreek"]),
            ("Root", &["Carrot", "Beetroot", "Potato", "Radish"]),
            ("Seasonal", &["Pumpkin", "Cucumber", "Tomato", "Brinjal"]),
            ("By-products", &["Pickles", "Dried Veg Mixes", "Vegetable Powders", "Sauces"]),
        ],
    ),
    (
        "Herbs",
        &[
            ("Medicinal", &["Tulsi", "Aloe Vera", "Neem", "Ashwagandha"]),
            ("Culinary", &["Basil", "Rosemary", "Thyme", "Oregano"]),
            ("By-products", &["Herbal Oils", "Herbal Powders", "Dried Herb Mixes", "Herbal Teas"]),
        ],
    ),
    (
        "Flowers",
        &[
            ("Garden", &["Rose", "Jasmine", "Marigold", "Sunflower"]),
            ("Decorative", &["Orchid", "Lily", "Chrysanthemum"]),
            ("By-products", &["Essential Oils", "Dried Petals", "Perfume Extracts", "Flower Powders"]),
        ],
    ),
    (
        "Roots & Ayurvedic",
        &[
            ("Main Roots", &["Ginger", "Turmeric", "Garlic", "Ginseng"]),
            ("By-products", &["Dried Roots", "Herbal Extracts", "Powders", "Medicinal Oils"]),
        ],
    ),
    (
        "Ornamental & Indoor",
        &[
            ("Indoor", &["Money Plant", "Snake Plant", "Peace Lily", "Areca Palm"]),
            ("Outdoor", &["Bonsai", "Cactus", "Croton", "Hibiscus"]),
            ("By-products", &["Pots & Planters", "Compost & Soil Mix", "Fertilizers", "Seeds"]),
        ],
    ),
];

#[derive(Debug, Clone, Serialize)]
pub struct CategoryNode {
    pub name: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    fn leaf(name: &'static str) -> Self {
        Self { name, children: Vec::new() }
    }
}

/// The browse tree rooted at "Plants", in display order.
pub fn category_tree() -> CategoryNode {
    CategoryNode {
        name: "Plants",
        children: CATEGORY_TREE
            .iter()
            .map(|&(section, groups)| CategoryNode {
                name: section,
                children: groups
                    .iter()
                    .map(|&(group, items)| CategoryNode {
                        name: group,
                        children: items.iter().copied().map(CategoryNode::leaf).collect(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_keeps_display_order() {
        let tree = category_tree();
        assert_eq!(tree.name, "Plants");
        let sections: Vec<&str> = tree.children.iter().map(|c| c.name).collect();
        assert_eq!(sections[0], "Fruits");
        assert_eq!(sections.last(), Some(&"Ornamental & Indoor"));

        let herbs = &tree.children[2];
        assert_eq!(herbs.children[0].name, "Medicinal");
        assert!(herbs.children[0].children.iter().any(|c| c.name == "Tulsi"));
    }

    #[test]
    fn test_leaves_serialize_without_children() {
        let json = serde_json::to_value(CategoryNode::leaf("Mint")).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Mint" }));
    }
}
