//! Fixed sentiment lexicon.
//!
//! AFINN-style word valences in the range -5..=5. The table is the scoring
//! algorithm's only data source; words not listed contribute zero.

/// Word/valence pairs. Weights follow the AFINN sign conventions used by the
/// mood-theme thresholds (negative = sad, positive = happy).
pub const LEXICON: &[(&str, i32)] = &[
    // Positive
    ("amazing", 4),
    ("awesome", 4),
    ("beautiful", 3),
    ("better", 2),
    ("blessed", 3),
    ("brave", 2),
    ("bright", 1),
    ("calm", 2),
    ("cheerful", 2),
    ("comfort", 2),
    ("comfortable", 2),
    ("confident", 2),
    ("content", 2),
    ("delighted", 3),
    ("eager", 2),
    ("ease", 2),
    ("encouraged", 2),
    ("energetic", 2),
    ("enjoy", 2),
    ("enjoyed", 2),
    ("excellent", 3),
    ("excited", 3),
    ("fantastic", 4),
    ("fine", 2),
    ("fun", 4),
    ("glad", 3),
    ("good", 3),
    ("grateful", 3),
    ("great", 3),
    ("happier", 2),
    ("happy", 3),
    ("healthy", 2),
    ("hope", 2),
    ("hopeful", 2),
    ("inspired", 2),
    ("joy", 3),
    ("joyful", 3),
    ("kind", 2),
    ("laugh", 1),
    ("laughing", 1),
    ("love", 3),
    ("loved", 3),
    ("lucky", 3),
    ("nice", 3),
    ("optimistic", 2),
    ("peaceful", 2),
    ("perfect", 3),
    ("pleasant", 3),
    ("pleased", 3),
    ("positive", 2),
    ("proud", 2),
    ("refreshed", 2),
    ("relaxed", 2),
    ("relieved", 2),
    ("safe", 1),
    ("satisfied", 2),
    ("smile", 2),
    ("smiling", 2),
    ("strong", 2),
    ("superb", 5),
    ("thankful", 2),
    ("thrilled", 5),
    ("warm", 1),
    ("welcome", 2),
    ("wonderful", 4),
    ("worthy", 2),
    ("yes", 1),
    // Negative
    ("abandoned", -2),
    ("afraid", -2),
    ("alone", -2),
    ("angry", -3),
    ("annoyed", -2),
    ("anxious", -2),
    ("ashamed", -2),
    ("awful", -3),
    ("bad", -3),
    ("bitter", -2),
    ("broken", -1),
    ("cry", -1),
    ("crying", -2),
    ("cruel", -3),
    ("dead", -3),
    ("depressed", -2),
    ("depressing", -2),
    ("despair", -3),
    ("devastated", -2),
    ("difficult", -1),
    ("disappointed", -2),
    ("disaster", -2),
    ("dread", -2),
    ("dreadful", -3),
    ("empty", -1),
    ("exhausted", -2),
    ("fail", -2),
    ("failure", -2),
    ("fear", -2),
    ("frightened", -2),
    ("frustrated", -2),
    ("grief", -2),
    ("guilt", -3),
    ("guilty", -3),
    ("hate", -3),
    ("helpless", -2),
    ("hopeless", -2),
    ("hurt", -2),
    ("insecure", -2),
    ("irritated", -2),
    ("jealous", -2),
    ("lonely", -2),
    ("lost", -3),
    ("mad", -3),
    ("miserable", -3),
    ("nervous", -2),
    ("numb", -1),
    ("pain", -2),
    ("painful", -2),
    ("panic", -3),
    ("regret", -2),
    ("sad", -2),
    ("scared", -2),
    ("shame", -2),
    ("sick", -2),
    ("sorry", -1),
    ("stress", -1),
    ("stressed", -2),
    ("struggle", -2),
    ("struggling", -2),
    ("stuck", -2),
    ("suffer", -2),
    ("suffering", -2),
    ("terrible", -3),
    ("terrified", -3),
    ("tired", -2),
    ("trouble", -2),
    ("troubled", -2),
    ("ugly", -3),
    ("unhappy", -2),
    ("upset", -2),
    ("weak", -2),
    ("worried", -3),
    ("worry", -3),
    ("worse", -3),
    ("worst", -3),
    ("worthless", -2),
    ("wrong", -2),
];
