//! Scene projection: what a session is allowed to see of its current scene.
//!
//! A non-start scene with exactly one option projects a single pseudo-option
//! labeled "(locked)" no matter what the real option list holds - branching
//! behind a forced continuation stays hidden. Everywhere else each option is
//! marked locked against the session's inventory, with locked display text
//! suffixed rather than hidden.

use storyloom_domain::{ItemCounts, Scene};
use storyloom_protocol::{OptionPayload, ScenePayload};

use crate::infrastructure::graph::StoryGraph;
use crate::infrastructure::ports::StoreError;

const FORCED_CONTINUATION_LABEL: &str = "(locked)";
const LOCKED_SUFFIX: &str = " (locked)";

pub async fn project_scene(
    scene: &Scene,
    inventory: &ItemCounts,
    graph: &StoryGraph,
) -> Result<ScenePayload, StoreError> {
    let options = if scene.options.len() == 1 && !scene.is_start() {
        vec![OptionPayload {
            value: FORCED_CONTINUATION_LABEL.to_string(),
            locked: true,
        }]
    } else {
        scene
            .options
            .iter()
            .map(|option| {
                let locked = !inventory.satisfies(&option.required_items);
                let value = if locked {
                    format!("{}{}", option.value, LOCKED_SUFFIX)
                } else {
                    option.value.clone()
                };
                OptionPayload { value, locked }
            })
            .collect()
    };

    let held: Vec<_> = inventory.ids().collect();
    let item_map = graph.get_items(&held).await?;

    Ok(ScenePayload {
        id: scene.id,
        value: scene.value.clone(),
        options,
        items: inventory.clone(),
        item_map,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::store::{MemoryBackend, Store, DEFAULT_CACHE_TTL};
    use std::sync::Arc;
    use storyloom_domain::{ItemId, Link, SceneId, SceneOption};

    fn graph() -> StoryGraph {
        let backend = Arc::new(MemoryBackend::new());
        StoryGraph::new(Arc::new(Store::new(backend, DEFAULT_CACHE_TTL)))
    }

    fn option(value: &str, required: ItemCounts) -> SceneOption {
        SceneOption {
            value: value.to_string(),
            required_items: required,
            link: vec![Link::new(SceneId::new(), 1.0)],
        }
    }

    #[tokio::test]
    async fn test_single_option_non_start_scene_projects_one_pseudo_option() {
        let graph = graph();
        let mut scene = Scene::new(SceneId::new(), "a narrow corridor", ItemCounts::new());
        scene.options.push(option("Keep walking", ItemCounts::new()));

        let payload = project_scene(&scene, &ItemCounts::new(), &graph)
            .await
            .expect("project");

        assert_eq!(payload.options.len(), 1);
        assert_eq!(payload.options[0].value, "(locked)");
        assert!(payload.options[0].locked);
    }

    #[tokio::test]
    async fn test_start_scene_single_option_is_shown_as_is() {
        let graph = graph();
        let mut scene = Scene::new(Scene::start_id(), "welcome", ItemCounts::new());
        scene.options.push(option("Begin", ItemCounts::new()));

        let payload = project_scene(&scene, &ItemCounts::new(), &graph)
            .await
            .expect("project");

        assert_eq!(payload.options[0].value, "Begin");
        assert!(!payload.options[0].locked);
    }

    #[tokio::test]
    async fn test_locked_options_keep_their_text_with_a_suffix() {
        let graph = graph();
        let key = ItemId::new();
        let required: ItemCounts = [(key, 1)].into_iter().collect();

        let mut scene = Scene::new(SceneId::new(), "a locked door", ItemCounts::new());
        scene.options.push(option("Open the door", required));
        scene.options.push(option("Walk away", ItemCounts::new()));

        let payload = project_scene(&scene, &ItemCounts::new(), &graph)
            .await
            .expect("project");

        assert_eq!(payload.options[0].value, "Open the door (locked)");
        assert!(payload.options[0].locked);
        assert_eq!(payload.options[1].value, "Walk away");
        assert!(!payload.options[1].locked);
    }

    #[tokio::test]
    async fn test_inventory_unlocks_options() {
        let graph = graph();
        let key = ItemId::new();
        let required: ItemCounts = [(key, 1)].into_iter().collect();
        let held: ItemCounts = [(key, 2)].into_iter().collect();

        let mut scene = Scene::new(SceneId::new(), "a locked door", ItemCounts::new());
        scene.options.push(option("Open the door", required));
        scene.options.push(option("Walk away", ItemCounts::new()));

        let payload = project_scene(&scene, &held, &graph).await.expect("project");
        assert!(!payload.options[0].locked);
        assert_eq!(payload.options[0].value, "Open the door");
    }

    #[tokio::test]
    async fn test_item_map_describes_held_items() {
        let graph = graph();
        let id = graph
            .create_item("Brass compass", Some("Points somewhere".to_string()))
            .await
            .expect("create");
        let held: ItemCounts = [(id, 1)].into_iter().collect();
        let scene = Scene::new(SceneId::new(), "camp", ItemCounts::new());

        let payload = project_scene(&scene, &held, &graph).await.expect("project");
        assert_eq!(payload.items.count(id), 1);
        assert_eq!(payload.item_map[&id].name, "Brass compass");
    }
}
