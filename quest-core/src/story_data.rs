//! The built-in adventure: a tavern, a forest, a dungeon and its master.
//!
//! Four chapters and three endings. Encounters sit on their own nodes and
//! carry no choices; winning moves on to the post-combat node.

use crate::character::SkillType;
use crate::story::{StoryChoice, StoryNode};

/// Every node of the built-in adventure.
pub fn nodes() -> Vec<StoryNode> {
    let mut nodes = tavern();
    nodes.extend(forest());
    nodes.extend(dungeon());
    nodes.extend(finale());
    nodes
}

// ============================================================================
// Chapter 1: The tavern
// ============================================================================

fn tavern() -> Vec<StoryNode> {
    vec![
        StoryNode::new(
            "start",
            "The Golden Dragon",
            1,
            "Rain follows you through the heavy oak door. The tavern is full tonight, \
             yet the room is oddly quiet. A dwarf polishes mugs behind the bar, and a \
             hooded stranger in the corner is watching you.",
        )
        .with_choice(StoryChoice::new("Walk up to the bar", "tavern_bar"))
        .with_choice(StoryChoice::new("Approach the hooded stranger", "tavern_stranger"))
        .with_choice(
            StoryChoice::new("Listen to the room", "tavern_observe_success")
                .with_check(SkillType::Perception, 12)
                .on_fail("tavern_observe_fail"),
        ),
        StoryNode::new(
            "tavern_bar",
            "At the Bar",
            1,
            "The dwarf, Grimm by the sign over the taps, slides you an ale. \"People have \
             been vanishing from the village at night. They say a necromancer has taken \
             the old dungeon under Moon Mountain. The mayor pays a hundred gold to whoever \
             ends it.\"",
        )
        .with_choice(
            StoryChoice::new("\"Count me in. Tell me about the dungeon.\"", "tavern_quest_accepted")
                .grants_xp(10),
        )
        .with_choice(
            StoryChoice::new("\"A hundred gold? For a necromancer?\"", "tavern_haggle")
                .with_check(SkillType::Persuasion, 13)
                .on_fail("tavern_haggle_fail"),
        )
        .with_choice(StoryChoice::new("\"Let me finish my ale first.\"", "tavern_drink").heals(3)),
        StoryNode::new(
            "tavern_stranger",
            "The Stranger",
            1,
            "The stranger pushes back her hood: an elf, her eyes sharp and tired. \"You \
             have the look of someone who can swing a blade. I need one.\"",
        )
        .with_choice(StoryChoice::new("\"Who are you?\"", "tavern_stranger_reveal"))
        .with_choice(
            StoryChoice::new("\"What do you need?\"", "tavern_stranger_quest").grants_xp(15),
        )
        .with_choice(
            StoryChoice::new("Study her face for a lie", "tavern_stranger_insight")
                .with_check(SkillType::Wisdom, 14)
                .on_fail("tavern_stranger_insight_fail"),
        ),
        StoryNode::new(
            "tavern_observe_success",
            "Overheard",
            1,
            "Between the clatter of mugs you catch three things: the stranger keeps glancing \
             at the door, the barkeep is worried sick, and a farmer mutters about a black \
             iron key he found in his field.",
        )
        .with_choice(StoryChoice::new("Talk to the stranger", "tavern_stranger").grants_xp(10))
        .with_choice(StoryChoice::new("Talk to the barkeep", "tavern_bar").grants_xp(10))
        .with_choice(StoryChoice::new("Talk to the farmer", "tavern_key_farmer").grants_xp(15)),
        StoryNode::new(
            "tavern_observe_fail",
            "Noise",
            1,
            "The bard picks that moment to start a drinking song. You learn nothing.",
        )
        .with_choice(StoryChoice::new("Walk up to the bar", "tavern_bar"))
        .with_choice(StoryChoice::new("Approach the stranger", "tavern_stranger")),
        StoryNode::new(
            "tavern_haggle",
            "A Better Deal",
            1,
            "Grimm laughs and adds fifty gold of his own, plus a potion from under the \
             counter. \"Bring them back alive.\"",
        )
        .with_choice(
            StoryChoice::new("Shake on it", "tavern_quest_accepted")
                .grants_item("health_potion")
                .grants_gold(50)
                .grants_xp(20),
        ),
        StoryNode::new(
            "tavern_haggle_fail",
            "No Deal",
            1,
            "Grimm's face hardens. \"A hundred is what there is. Take it or leave it.\"",
        )
        .with_choice(StoryChoice::new("Take it", "tavern_quest_accepted").grants_xp(5))
        .with_choice(StoryChoice::new("Try the stranger instead", "tavern_stranger")),
        StoryNode::new(
            "tavern_drink",
            "A Quiet Ale",
            1,
            "The ale is good and the fire is warm. For a moment the world can wait.",
        )
        .with_choice(StoryChoice::new("Ask Grimm about the job", "tavern_quest_accepted").grants_xp(5))
        .with_choice(StoryChoice::new("Approach the stranger", "tavern_stranger")),
        StoryNode::new(
            "tavern_stranger_reveal",
            "Elara",
            1,
            "\"Elara. I was a ranger of the Moonwood until the necromancer's dead walked \
             through it. My brother is one of the taken.\"",
        )
        .with_choice(StoryChoice::new("\"How can I help?\"", "tavern_stranger_quest").grants_xp(15))
        .with_choice(
            StoryChoice::new("\"I'll talk to the barkeep first.\"", "tavern_quest_accepted")
                .grants_xp(10),
        ),
        StoryNode::new(
            "tavern_stranger_quest",
            "The Amulet",
            1,
            "Elara presses a silver amulet into your hand. \"It turned a blade for me once. \
             The dungeon lies past the forest. Go tonight.\"",
        )
        .with_choice(
            StoryChoice::new("Head for the forest", "forest_entrance")
                .grants_item("amulet_protection")
                .grants_xp(20),
        ),
        StoryNode::new(
            "tavern_stranger_insight",
            "True Words",
            1,
            "There is grief in her face, and no deceit. She notices you noticing.",
        )
        .with_choice(StoryChoice::new("Ask who she is", "tavern_stranger_reveal").grants_xp(20)),
        StoryNode::new(
            "tavern_stranger_insight_fail",
            "Unreadable",
            1,
            "Her expression gives away nothing at all.",
        )
        .with_choice(StoryChoice::new("Ask who she is", "tavern_stranger_reveal"))
        .with_choice(StoryChoice::new("Go to the bar", "tavern_bar")),
        StoryNode::new(
            "tavern_key_farmer",
            "The Farmer",
            1,
            "The farmer clutches a black iron key. \"Cold as the grave, this thing. Found it \
             the night my neighbour vanished.\"",
        )
        .with_choice(
            StoryChoice::new("Ask him for the key", "tavern_key_obtained")
                .with_check(SkillType::Persuasion, 11)
                .on_fail("tavern_key_refused"),
        )
        .with_choice(StoryChoice::new("Leave him be", "tavern_quest_accepted").grants_xp(10)),
        StoryNode::new(
            "tavern_key_obtained",
            "The Key",
            1,
            "\"Take it. I never want to see it again.\"",
        )
        .with_choice(
            StoryChoice::new("Pocket the key", "tavern_quest_accepted")
                .grants_item("mysterious_key")
                .grants_xp(25),
        ),
        StoryNode::new(
            "tavern_key_refused",
            "Refused",
            1,
            "The farmer shoves the key back into his coat and turns away.",
        )
        .with_choice(StoryChoice::new("Go find the barkeep", "tavern_quest_accepted")),
        StoryNode::new(
            "tavern_quest_accepted",
            "The Quest",
            1,
            "You take a room for the night. At dawn, rested, you set out for the forest.",
        )
        .with_choice(
            StoryChoice::new("Sleep, then set out", "forest_entrance")
                .grants_xp(10)
                .full_heal(),
        ),
    ]
}

// ============================================================================
// Chapter 2: The forest
// ============================================================================

fn forest() -> Vec<StoryNode> {
    vec![
        StoryNode::new(
            "forest_entrance",
            "The Dark Wood",
            2,
            "The trees close in overhead. The main path runs straight on; a fainter trail \
             leads toward old ruins.",
        )
        .with_choice(StoryChoice::new("Take the main path", "forest_main_path"))
        .with_choice(StoryChoice::new("Follow the trail to the ruins", "forest_ruins"))
        .with_choice(
            StoryChoice::new("Look for tracks", "forest_tracks_success")
                .with_check(SkillType::Perception, 13)
                .on_fail("forest_main_path"),
        ),
        StoryNode::new(
            "forest_tracks_success",
            "Tracks",
            2,
            "Small clawed feet and something dragged. Goblins, with a captive, and a \
             crude snare strung across the path ahead.",
        )
        .with_choice(StoryChoice::new("Circle around the snare", "forest_ambush_avoided").grants_xp(20))
        .with_choice(StoryChoice::new("Spring the snare on purpose", "forest_goblin_fight").grants_xp(10)),
        StoryNode::new(
            "forest_main_path",
            "Ambush!",
            2,
            "A shriek from the bushes, and a goblin leaps out waving a rusty blade.",
        )
        .with_encounter("goblin", "forest_after_goblin"),
        StoryNode::new(
            "forest_goblin_fight",
            "Goblin Scout",
            2,
            "The snare snaps shut on nothing, but the noise brings a goblin scout running.",
        )
        .with_encounter("goblin", "forest_after_goblin_trap"),
        StoryNode::new(
            "forest_ambush_avoided",
            "Unseen",
            2,
            "You reach the goblin camp unseen. A shaman stands guard over a bound young woman.",
        )
        .with_choice(StoryChoice::new("Charge the shaman", "forest_rescue_fight"))
        .with_choice(
            StoryChoice::new("Sneak in and cut her loose", "forest_rescue_stealth")
                .with_check(SkillType::Stealth, 14)
                .on_fail("forest_rescue_fight"),
        )
        .with_choice(StoryChoice::new("Leave her and move on", "forest_crossroads")),
        StoryNode::new(
            "forest_rescue_fight",
            "The Shaman",
            2,
            "The shaman turns, green fire already dancing on its staff.",
        )
        .with_encounter("goblin_shaman", "forest_rescue_success"),
        StoryNode::new(
            "forest_rescue_stealth",
            "Silent Rescue",
            2,
            "The ropes part and you are both gone before the shaman looks up. She is the \
             miller's daughter, and she gives you a potion she stole from the camp.",
        )
        .with_choice(
            StoryChoice::new("Send her home and press on", "forest_crossroads")
                .grants_item("health_potion")
                .grants_xp(40),
        ),
        StoryNode::new(
            "forest_rescue_success",
            "Rescued",
            2,
            "The shaman falls. The miller's daughter thanks you and presses a potion into \
             your hands.",
        )
        .with_choice(
            StoryChoice::new("Send her home and press on", "forest_crossroads")
                .grants_item("health_potion")
                .grants_xp(30),
        ),
        StoryNode::new(
            "forest_after_goblin",
            "After the Ambush",
            2,
            "The goblin carried a few coins.",
        )
        .with_choice(StoryChoice::new("Take them and move on", "forest_crossroads").grants_gold(8)),
        StoryNode::new(
            "forest_after_goblin_trap",
            "Scout's Purse",
            2,
            "The scout's purse is light, but it had a map scratched on bark.",
        )
        .with_choice(
            StoryChoice::new("Follow the map", "forest_crossroads")
                .grants_gold(5)
                .grants_xp(10),
        ),
        StoryNode::new(
            "forest_ruins",
            "The Ruins",
            2,
            "Broken columns ring a mossy altar. Runes crawl across the stone, and an iron-bound \
             chest lies half buried beside it.",
        )
        .with_choice(
            StoryChoice::new("Decipher the runes", "forest_ruins_inscription")
                .with_check(SkillType::Arcana, 13)
                .on_fail("forest_ruins_fail"),
        )
        .with_choice(
            StoryChoice::new("Force the chest", "forest_ruins_chest")
                .with_check(SkillType::Strength, 14)
                .on_fail("forest_ruins_fail"),
        )
        .with_choice(StoryChoice::new("Leave the ruins alone", "forest_crossroads")),
        StoryNode::new(
            "forest_ruins_inscription",
            "The Inscription",
            2,
            "The runes name a hidden niche. Inside lies a heavy gold ring.",
        )
        .with_choice(
            StoryChoice::new("Take the ring", "forest_crossroads")
                .grants_item("ring_strength")
                .grants_xp(30),
        ),
        StoryNode::new(
            "forest_ruins_chest",
            "The Chest",
            2,
            "The lid gives with a shriek of rust. Coins, and a glowing red potion.",
        )
        .with_choice(
            StoryChoice::new("Take everything", "forest_crossroads")
                .grants_item("greater_health_potion")
                .grants_gold(20)
                .grants_xp(20),
        ),
        StoryNode::new(
            "forest_ruins_fail",
            "Nothing Doing",
            2,
            "The ruins keep their secrets. You learned something from trying, at least.",
        )
        .with_choice(StoryChoice::new("Move on", "forest_crossroads").grants_xp(5)),
        StoryNode::new(
            "forest_crossroads",
            "Moon Mountain",
            2,
            "The trees thin out at the foot of Moon Mountain. A dark opening gapes in the rock, \
             draped in thick webs.",
        )
        .with_choice(StoryChoice::new("Walk straight in", "dungeon_spider"))
        .with_choice(
            StoryChoice::new("Inspect the entrance first", "forest_investigate_entrance")
                .with_check(SkillType::Perception, 12)
                .on_fail("dungeon_spider"),
        )
        .with_choice(StoryChoice::new("Catch your breath", "forest_crossroads")),
        StoryNode::new(
            "forest_investigate_entrance",
            "Webs",
            2,
            "Something large is nesting just inside. A side passage leads around it.",
        )
        .with_choice(StoryChoice::new("Take the side passage", "dungeon_entrance").grants_xp(25))
        .with_choice(StoryChoice::new("Attack the nest", "dungeon_spider_surprise").grants_xp(10)),
    ]
}

// ============================================================================
// Chapter 3: The dungeon
// ============================================================================

fn dungeon() -> Vec<StoryNode> {
    vec![
        StoryNode::new(
            "dungeon_spider",
            "The Spider",
            3,
            "The webs tremble. A spider the size of a cart drops from the ceiling.",
        )
        .with_encounter("giant_spider", "dungeon_entrance"),
        StoryNode::new(
            "dungeon_spider_surprise",
            "Into the Nest",
            3,
            "You strike first, but the spider is fast.",
        )
        .with_encounter("giant_spider", "dungeon_entrance"),
        StoryNode::new(
            "dungeon_entrance",
            "The Great Hall",
            3,
            "Torches burn with green flame. Three ways lead on: a rattling room to the left, \
             a reek of chemicals to the right, and a rune-carved door ahead.",
        )
        .with_choice(StoryChoice::new("Go left", "dungeon_skeleton_room"))
        .with_choice(StoryChoice::new("Go right", "dungeon_alchemy_room"))
        .with_choice(StoryChoice::new("Approach the door", "dungeon_rune_door")),
        StoryNode::new(
            "dungeon_skeleton_room",
            "Bones",
            3,
            "A skeleton in rotted mail rises from its bier.",
        )
        .with_encounter("skeleton", "dungeon_skeleton_loot"),
        StoryNode::new(
            "dungeon_skeleton_loot",
            "The Bier",
            3,
            "The skeleton collapses. Its bier holds a purse and a potion.",
        )
        .with_choice(
            StoryChoice::new("Take them, then go to the alchemist's room", "dungeon_alchemy_room")
                .grants_gold(15)
                .grants_item("health_potion")
                .grants_xp(10),
        )
        .with_choice(
            StoryChoice::new("Take them, then go to the rune door", "dungeon_rune_door")
                .grants_gold(15)
                .grants_item("health_potion")
                .grants_xp(10),
        ),
        StoryNode::new(
            "dungeon_alchemy_room",
            "The Laboratory",
            3,
            "Bubbling flasks cover every table. One potion glows red; a stack of notes lies \
             beside a bottle of black liquid.",
        )
        .with_choice(
            StoryChoice::new("Take the red potion", "dungeon_alchemy_done")
                .grants_item("greater_health_potion")
                .grants_xp(10),
        )
        .with_choice(
            StoryChoice::new("Read the notes", "dungeon_alchemy_notes")
                .with_check(SkillType::Arcana, 14)
                .on_fail("dungeon_alchemy_done"),
        )
        .with_choice(StoryChoice::new("Sniff the black bottle", "dungeon_alchemy_black").grants_xp(5)),
        StoryNode::new(
            "dungeon_alchemy_notes",
            "The Notes",
            3,
            "The notes describe the necromancer's soul seal, and tucked among them is a \
             scroll of fire.",
        )
        .with_choice(
            StoryChoice::new("Take the scroll", "dungeon_alchemy_done")
                .grants_item("scroll_fireball")
                .grants_xp(35),
        ),
        StoryNode::new(
            "dungeon_alchemy_black",
            "Black Draught",
            3,
            "Your head swims, then clears. You feel you understand this place a little better.",
        )
        .with_choice(StoryChoice::new("Steady yourself", "dungeon_alchemy_done").grants_xp(15)),
        StoryNode::new(
            "dungeon_alchemy_done",
            "Done Here",
            3,
            "Nothing else here is worth the risk.",
        )
        .with_choice(StoryChoice::new("Go to the rune door", "dungeon_rune_door")),
        StoryNode::new(
            "dungeon_rune_door",
            "The Rune Door",
            3,
            "The door is sealed with glowing runes. Below them is a keyhole of black iron.",
        )
        .with_choice(
            StoryChoice::new("Use the black iron key", "dungeon_secret_room")
                .requires("mysterious_key"),
        )
        .with_choice(
            StoryChoice::new("Unravel the runes", "dungeon_boss_approach")
                .with_check(SkillType::Arcana, 15)
                .on_fail("dungeon_rune_fail"),
        )
        .with_choice(
            StoryChoice::new("Break it down", "dungeon_boss_approach")
                .with_check(SkillType::Strength, 16)
                .on_fail("dungeon_rune_fail"),
        ),
        StoryNode::new(
            "dungeon_rune_fail",
            "Backlash",
            3,
            "The runes flare and throw you back, but the door cracks open anyway.",
        )
        .with_choice(StoryChoice::new("Squeeze through", "dungeon_boss_approach").grants_xp(5)),
        StoryNode::new(
            "dungeon_secret_room",
            "The Hidden Vault",
            3,
            "The key opens a vault no one has entered in centuries. On a stand rests a \
             sword whose blade smoulders.",
        )
        .with_choice(
            StoryChoice::new("Take the sword", "dungeon_boss_approach")
                .grants_item("fire_sword")
                .grants_xp(50),
        ),
    ]
}

// ============================================================================
// Chapter 4: The necromancer
// ============================================================================

fn finale() -> Vec<StoryNode> {
    vec![
        StoryNode::new(
            "dungeon_boss_approach",
            "The Throne Room",
            4,
            "Cages line the walls, full of villagers. On a throne of bone sits the \
             necromancer, the soul seal pulsing in his hand.",
        )
        .with_choice(StoryChoice::new("Step forward", "dungeon_boss_fight"))
        .with_choice(StoryChoice::new("Wait in the shadows", "dungeon_boss_approach")),
        StoryNode::new(
            "dungeon_boss_fight",
            "The Necromancer",
            4,
            "\"Another hero,\" the necromancer sighs, and rises.",
        )
        .with_encounter("necromancer", "dungeon_boss_defeated"),
        StoryNode::new(
            "dungeon_boss_defeated",
            "The Soul Seal",
            4,
            "The necromancer crumbles to dust. The soul seal lies on the floor, still pulsing.",
        )
        .with_choice(StoryChoice::new("Destroy the seal", "ending_destroy").grants_xp(100))
        .with_choice(StoryChoice::new("Take the seal's power", "ending_take").grants_xp(100))
        .with_choice(StoryChoice::new("Seal it away", "ending_seal").grants_xp(100)),
        StoryNode::new(
            "ending_destroy",
            "Dawn",
            4,
            "The seal shatters in white light. The dead fall still, the cages open, and the \
             village greets you as a hero.",
        )
        .ending(),
        StoryNode::new(
            "ending_take",
            "The New Master",
            4,
            "Power floods through you. The dead turn to you and wait for orders.",
        )
        .ending(),
        StoryNode::new(
            "ending_seal",
            "The Watcher",
            4,
            "You lock the seal deep beneath the mountain and stay to guard it.",
        )
        .ending(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::StoryGraph;
    use std::collections::{HashSet, VecDeque};

    #[test]
    fn test_builtin_graph_is_valid() {
        let graph = StoryGraph::from_nodes(nodes()).expect("unique ids");
        graph.validate("start").expect("all references resolve");
        assert_eq!(graph.len(), StoryGraph::builtin().len());
    }

    #[test]
    fn test_three_endings() {
        assert_eq!(StoryGraph::builtin().endings().count(), 3);
    }

    #[test]
    fn test_every_node_reachable_from_start() {
        let graph = StoryGraph::builtin();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from(["start".to_string()]);
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id.clone()) {
                continue;
            }
            let node = graph.get(&id).expect("validated");
            for choice in &node.choices {
                queue.extend(choice.targets().map(str::to_string));
            }
            if let Some(after) = &node.post_combat_node_id {
                queue.push_back(after.clone());
            }
        }
        assert_eq!(seen.len(), graph.len());
    }

    #[test]
    fn test_encounters_have_no_choices() {
        for node in StoryGraph::builtin().nodes() {
            if node.is_encounter() {
                assert!(node.choices.is_empty(), "{} mixes combat and choices", node.id);
                assert!(node.post_combat_node_id.is_some());
            }
        }
    }

    #[test]
    fn test_non_endings_have_a_way_forward() {
        for node in StoryGraph::builtin().nodes() {
            if !node.is_ending {
                assert!(
                    !node.choices.is_empty() || node.is_encounter(),
                    "{} is a dead end",
                    node.id
                );
            }
        }
    }
}
